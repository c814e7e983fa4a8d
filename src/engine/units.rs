// ==========================================
// Система производственного планирования - словарь единиц измерения
// ==========================================
// Назначение: сопоставление GUID единицы измерения -> обозначение,
//             построенное один раз на запрос верхнего уровня
//             и передаваемое во все построители узлов
// Неполный справочник ЕИ не ошибка: узел без обозначения рендерится
// с пустой меткой
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::repository::UnitRepository;

/// Словарь GUID ЕИ -> человекочитаемое обозначение
pub struct UnitMap {
    map: HashMap<String, String>,
}

/// Снятие обёрток формата GUID: guid'...' и фигурные скобки.
///
/// В выгрузках из 1С встречаются значения вида
/// guid'e3b0c442-...' и {E3B0C442-...}.
fn cleanup_guid(raw: &str) -> String {
    let mut s = raw.trim().trim_matches(|c| c == '{' || c == '}').trim();
    let lower = s.to_lowercase();
    if lower.starts_with("guid'") && s.ends_with('\'') && s.len() > 5 {
        s = &s[5..s.len() - 1];
    }
    s.trim().trim_matches(|c| c == '{' || c == '}').trim().to_string()
}

impl UnitMap {
    /// Построение словаря из справочника units.
    ///
    /// Ошибка чтения справочника не валит запрос: дерево обязано
    /// строиться и без обозначений ЕИ (словарь остаётся пустым).
    pub fn load(units: &Arc<UnitRepository>) -> Self {
        let mut map = HashMap::new();
        match units.list_all() {
            Ok(rows) => {
                for unit in rows {
                    let guid = match unit.unit_ref1c.as_deref() {
                        Some(g) if !g.trim().is_empty() => g.trim().to_string(),
                        _ => continue,
                    };
                    if let Some(label) = unit.display_label() {
                        map.insert(guid, label);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("не удалось загрузить справочник ЕИ: {}", e);
            }
        }
        Self { map }
    }

    /// Пустой словарь (для тестов построителей узлов)
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Обозначение ЕИ по GUID.
    ///
    /// Перебираем варианты ключа: исходный, нижний/верхний регистр,
    /// и каждый из них со снятыми обёртками GUID. Нет совпадения - None
    /// (сырой GUID в интерфейсе не показываем).
    pub fn label(&self, unit_guid: Option<&str>) -> Option<String> {
        let raw = unit_guid?.trim();
        if raw.is_empty() {
            return None;
        }

        let mut candidates: Vec<String> = Vec::new();
        for base in [raw.to_string(), raw.to_lowercase(), raw.to_uppercase()] {
            if !candidates.contains(&base) {
                candidates.push(base.clone());
            }
            let cleaned = cleanup_guid(&base);
            if !cleaned.is_empty() && !candidates.contains(&cleaned) {
                candidates.push(cleaned);
            }
        }

        candidates
            .into_iter()
            .find_map(|key| self.map.get(&key).cloned())
    }

    /// Количество известных GUID (диагностика)
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ==========================================
// Единичные тесты
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn map_with(guid: &str, label: &str) -> UnitMap {
        let mut map = HashMap::new();
        map.insert(guid.to_string(), label.to_string());
        UnitMap { map }
    }

    #[test]
    fn test_label_exact_match() {
        let m = map_with("aaaa-bbbb", "шт");
        assert_eq!(m.label(Some("aaaa-bbbb")).as_deref(), Some("шт"));
    }

    #[test]
    fn test_label_strips_guid_wrappers() {
        let m = map_with("aaaa-bbbb", "шт");
        assert_eq!(m.label(Some("guid'aaaa-bbbb'")).as_deref(), Some("шт"));
        assert_eq!(m.label(Some("{aaaa-bbbb}")).as_deref(), Some("шт"));
        assert_eq!(m.label(Some("GUID'AAAA-BBBB'")).as_deref(), Some("шт"));
    }

    #[test]
    fn test_label_case_variants() {
        let m = map_with("AAAA-BBBB", "кг");
        assert_eq!(m.label(Some("aaaa-bbbb")).as_deref(), Some("кг"));
    }

    #[test]
    fn test_label_unknown_guid_is_none() {
        let m = map_with("aaaa-bbbb", "шт");
        assert_eq!(m.label(Some("cccc-dddd")), None);
        assert_eq!(m.label(Some("   ")), None);
        assert_eq!(m.label(None), None);
    }

    #[test]
    fn test_cleanup_guid() {
        assert_eq!(cleanup_guid("guid'abc'"), "abc");
        assert_eq!(cleanup_guid("{abc}"), "abc");
        assert_eq!(cleanup_guid("  abc  "), "abc");
        assert_eq!(cleanup_guid("guid'{abc}'"), "abc");
    }
}
