// ==========================================
// Система производственного планирования - модели каталога
// ==========================================
// Основание: схема БД каталога (зеркало справочников 1С)
// Назначение: типизированные записи на границе слоя хранения;
//             приведение типов выполняется один раз в репозиториях,
//             рекурсивная логика работает только с этими структурами
// Владелец данных: подсистема синхронизации с 1С (движок только читает)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Item - номенклатура
// ==========================================
// Соответствие: таблица items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub item_id: i64,                          // внутренний ID
    pub item_code: String,                     // код номенклатуры (внешний код)
    pub item_name: String,                     // наименование
    pub item_article: Option<String>,          // артикул
    pub item_ref1c: Option<String>,            // GUID из 1С (Ref_Key)
    pub replenishment_method: Option<String>,  // способ пополнения: "Производство" / "Закупка"
    pub unit: Option<String>,                  // GUID единицы измерения
    pub stock_qty: f64,                        // текущий остаток
}

impl Item {
    /// Проверка: способ пополнения - производство.
    ///
    /// Сравнение регистронезависимое, пробелы обрезаются
    /// (в выгрузках встречаются и "Производство", и "production").
    pub fn is_production(&self) -> bool {
        match &self.replenishment_method {
            Some(m) => {
                let m = m.trim().to_lowercase();
                m == "производство" || m == "production"
            }
            None => false,
        }
    }
}

// ==========================================
// Specification - спецификация (состав изделия)
// ==========================================
// Соответствие: таблица specifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specification {
    pub spec_id: i64,
    pub spec_code: Option<String>,  // код спецификации
    pub spec_name: String,          // наименование
    pub spec_ref1c: Option<String>, // GUID из 1С
}

// ==========================================
// SpecComponent - строка состава спецификации
// ==========================================
// Соответствие: таблица spec_components
// Инвариант: quantity >= 0; отсутствие этапа - валидные данные
//            (узел получает предупреждение NO_STAGE, не ошибку)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecComponent {
    pub component_id: i64,
    pub spec_id: i64,                    // родительская спецификация
    pub item_id: i64,                    // дочерняя номенклатура
    pub quantity: f64,                   // количество на единицу родителя
    pub stage_id: Option<i64>,           // этап появления компонента
    pub component_type: Option<String>,  // "Материал" / "Сборка" / услуга
}

// ==========================================
// SpecOperation - строка операций спецификации
// ==========================================
// Соответствие: таблица spec_operations
// Норма времени задана на единицу НЕПОСРЕДСТВЕННОГО родителя,
// а не на единицу корневого изделия
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecOperation {
    pub spec_operation_id: i64,
    pub spec_id: i64,
    pub operation_id: i64,
    pub time_norm: Option<f64>,  // нормо-часы на единицу родителя
    pub stage_id: Option<i64>,
}

// ==========================================
// Operation - справочник операций (навигационный)
// ==========================================
// Соответствие: таблица operations
// Имя операции может отсутствовать - это валидные данные
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub operation_id: i64,
    pub operation_name: Option<String>,
    pub time_norm: Option<f64>,  // резервная норма, если в строке спецификации нормы нет
}

// ==========================================
// DefaultSpecification - спецификация по умолчанию
// ==========================================
// Соответствие: таблица default_specifications
// Уникальность: (item_id, characteristic_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultSpecification {
    pub id: i64,
    pub item_id: i64,
    pub characteristic_id: Option<String>,  // GUID характеристики (необязателен)
    pub spec_id: i64,
}

// ==========================================
// ProductionStage - этап производства
// ==========================================
// Соответствие: таблица production_stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionStage {
    pub stage_id: i64,
    pub stage_name: String,
    pub stage_order: Option<i64>,  // подсказка порядка сортировки
}

// ==========================================
// Unit - единица измерения
// ==========================================
// Соответствие: таблица units
// Все отображаемые поля необязательны: дерево должно строиться
// и при неполном справочнике ЕИ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: i64,
    pub unit_ref1c: Option<String>,  // GUID из 1С (ключ сопоставления)
    pub unit_code: Option<String>,
    pub unit_name: Option<String>,
    pub short_name: Option<String>,
    pub iso_code: Option<String>,
}

impl Unit {
    /// Человекочитаемое обозначение ЕИ.
    ///
    /// Приоритет: short_name -> unit_name -> iso_code -> unit_code.
    pub fn display_label(&self) -> Option<String> {
        for candidate in [
            &self.short_name,
            &self.unit_name,
            &self.iso_code,
            &self.unit_code,
        ] {
            if let Some(v) = candidate {
                let v = v.trim();
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
        None
    }
}
