// ==========================================
// Система производственного планирования - сводный расчёт по этапам
// ==========================================
// Назначение: для всех изделий плана выпуска развернуть составы
//             и сгруппировать производимые компоненты по этапам
//             появления (этап -> изделия -> компоненты, количество
//             на 1 изделие плана)
// В расчёт попадают только компоненты со способом пополнения
// "Производство" и заполненным этапом; защита от циклов и чрезмерной
// глубины - как в развёртке дерева
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Item, ProductionStage, SpecComponent};
use crate::engine::resolver::SpecResolver;
use crate::repository::{
    ItemRepository, PlanRepository, RepositoryResult, SpecificationRepository, StageRepository,
};

/// Защита от чрезмерной глубины развёртки
const ROLLUP_MAX_DEPTH: usize = 50;

// ==========================================
// Выходные структуры (формат ответа /v1/stages/calculate)
// ==========================================

/// Компонент в этапе: количество на 1 изделие плана
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageComponentOut {
    pub item_id: i64,
    pub item_code: String,
    pub item_name: String,
    pub qty_per_unit: f64,
    pub stock_qty: f64,
    pub replenishment_method: Option<String>,
    /// Минимальная партия запуска (источника данных пока нет)
    pub min_batch: Option<f64>,
    /// Максимальная партия запуска (источника данных пока нет)
    pub max_batch: Option<f64>,
}

/// Блок изделия внутри этапа
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProductBlock {
    pub root_item_id: i64,
    pub root_item_code: String,
    pub root_item_name: String,
    pub components: Vec<StageComponentOut>,
}

/// Этап с изделиями
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageBlock {
    pub stage_id: i64,
    pub stage_name: String,
    pub products: Vec<StageProductBlock>,
}

/// Результат сводного расчёта
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCalcResult {
    /// Метка времени последней синхронизации остатков (если известна)
    #[serde(rename = "asOf")]
    pub as_of: Option<String>,
    pub stages: Vec<StageBlock>,
}

// ==========================================
// StageRollupEngine - сводный расчёт
// ==========================================
pub struct StageRollupEngine {
    items: Arc<ItemRepository>,
    specs: Arc<SpecificationRepository>,
    stages: Arc<StageRepository>,
    plan: Arc<PlanRepository>,
    resolver: Arc<SpecResolver>,
}

/// Кэши одного расчёта: справочники читаются один раз,
/// составы спецификаций - лениво по мере развёртки
struct RollupCaches {
    items_by_id: HashMap<i64, Item>,
    spec_by_item: HashMap<i64, Option<i64>>,
    components_by_spec: HashMap<i64, Vec<SpecComponent>>,
}

impl StageRollupEngine {
    pub fn new(
        items: Arc<ItemRepository>,
        specs: Arc<SpecificationRepository>,
        stages: Arc<StageRepository>,
        plan: Arc<PlanRepository>,
        resolver: Arc<SpecResolver>,
    ) -> Self {
        Self {
            items,
            specs,
            stages,
            plan,
            resolver,
        }
    }

    /// Сводный расчёт по всем изделиям плана выпуска.
    ///
    /// `last_sync_file` - путь к config/last_sync_time.json
    /// (совместимость с прежним развёртыванием); нет файла - asOf = null.
    pub fn calculate(&self, last_sync_file: Option<&Path>) -> RepositoryResult<StageCalcResult> {
        let stage_by_id: HashMap<i64, ProductionStage> = self
            .stages
            .list_all()?
            .into_iter()
            .map(|s| (s.stage_id, s))
            .collect();

        let mut caches = RollupCaches {
            items_by_id: self
                .items
                .list_all()?
                .into_iter()
                .map(|i| (i.item_id, i))
                .collect(),
            spec_by_item: HashMap::new(),
            components_by_spec: HashMap::new(),
        };

        let root_ids: Vec<i64> = self
            .plan
            .list_root_product_item_ids()?
            .into_iter()
            .filter(|id| caches.items_by_id.contains_key(id))
            .collect();

        tracing::info!(roots = root_ids.len(), "сводный расчёт по этапам запущен");

        let mut per_stage: HashMap<i64, Vec<StageProductBlock>> = HashMap::new();

        for root_id in root_ids {
            // Изделие без управляющей спецификации в расчёт не попадает
            if self.resolved_spec(root_id, &mut caches)?.is_none() {
                continue;
            }

            let mut accum: HashMap<(i64, i64), f64> = HashMap::new();
            let mut path: Vec<i64> = Vec::new();
            self.expand_into(root_id, 1.0, &mut accum, &mut path, 0, &mut caches)?;

            let root_item = match caches.items_by_id.get(&root_id) {
                Some(item) => item.clone(),
                None => continue,
            };

            // Группировка накопленных количеств по этапам
            let mut per_stage_components: HashMap<i64, Vec<StageComponentOut>> = HashMap::new();
            for ((stage_id, comp_item_id), qty) in &accum {
                let comp_item = match caches.items_by_id.get(comp_item_id) {
                    Some(item) => item,
                    None => continue,
                };
                per_stage_components
                    .entry(*stage_id)
                    .or_default()
                    .push(StageComponentOut {
                        item_id: *comp_item_id,
                        item_code: comp_item.item_code.clone(),
                        item_name: comp_item.item_name.clone(),
                        qty_per_unit: *qty,
                        stock_qty: comp_item.stock_qty,
                        replenishment_method: comp_item.replenishment_method.clone(),
                        min_batch: None,
                        max_batch: None,
                    });
            }

            for (stage_id, mut components) in per_stage_components {
                // Стабильный порядок компонентов: по коду, затем по наименованию
                components.sort_by(|a, b| {
                    (a.item_code.as_str(), a.item_name.as_str())
                        .cmp(&(b.item_code.as_str(), b.item_name.as_str()))
                });
                per_stage.entry(stage_id).or_default().push(StageProductBlock {
                    root_item_id: root_id,
                    root_item_code: root_item.item_code.clone(),
                    root_item_name: root_item.item_name.clone(),
                    components,
                });
            }
        }

        // Итоговая структура: только этапы с данными
        let mut stages_out: Vec<StageBlock> = per_stage
            .into_iter()
            .map(|(stage_id, mut products)| {
                products.sort_by(|a, b| {
                    (a.root_item_code.as_str(), a.root_item_name.as_str())
                        .cmp(&(b.root_item_code.as_str(), b.root_item_name.as_str()))
                });
                let stage_name = stage_by_id
                    .get(&stage_id)
                    .map(|s| s.stage_name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("Этап {stage_id}"));
                StageBlock {
                    stage_id,
                    stage_name,
                    products,
                }
            })
            .collect();

        // Порядок этапов: stage_order (отсутствует - в конец), затем имя
        stages_out.sort_by(|a, b| {
            let order_a = stage_by_id
                .get(&a.stage_id)
                .and_then(|s| s.stage_order)
                .unwrap_or(i64::MAX);
            let order_b = stage_by_id
                .get(&b.stage_id)
                .and_then(|s| s.stage_order)
                .unwrap_or(i64::MAX);
            (order_a, a.stage_name.as_str()).cmp(&(order_b, b.stage_name.as_str()))
        });

        Ok(StageCalcResult {
            as_of: last_sync_file.and_then(read_last_stock_sync),
            stages: stages_out,
        })
    }

    /// Управляющая спецификация изделия (с кэшем на расчёт)
    fn resolved_spec(
        &self,
        item_id: i64,
        caches: &mut RollupCaches,
    ) -> RepositoryResult<Option<i64>> {
        if let Some(cached) = caches.spec_by_item.get(&item_id) {
            return Ok(*cached);
        }
        let resolved = match caches.items_by_id.get(&item_id) {
            Some(item) => self.resolver.resolve_for_item(item, None)?,
            None => None,
        };
        caches.spec_by_item.insert(item_id, resolved);
        Ok(resolved)
    }

    /// Рекурсивная развёртка состава с накоплением количеств.
    ///
    /// `accum` накапливает количество по ключу (этап, компонент);
    /// множитель - произведение количеств по цепочке родителей.
    fn expand_into(
        &self,
        item_id: i64,
        multiplier: f64,
        accum: &mut HashMap<(i64, i64), f64>,
        path: &mut Vec<i64>,
        depth: usize,
        caches: &mut RollupCaches,
    ) -> RepositoryResult<()> {
        if depth > ROLLUP_MAX_DEPTH {
            return Ok(());
        }
        if path.contains(&item_id) {
            // цикл в составе - ветка останавливается
            return Ok(());
        }

        let spec_id = match self.resolved_spec(item_id, caches)? {
            Some(spec_id) => spec_id,
            None => return Ok(()),
        };

        let components = match caches.components_by_spec.get(&spec_id) {
            Some(components) => components.clone(),
            None => {
                let components = self.specs.components_of(spec_id)?;
                caches
                    .components_by_spec
                    .insert(spec_id, components.clone());
                components
            }
        };

        path.push(item_id);
        for comp in components {
            let total = multiplier * comp.quantity;
            if total <= 0.0 {
                // нечего учитывать и разворачивать
                continue;
            }

            if let Some(stage_id) = comp.stage_id {
                let is_production = caches
                    .items_by_id
                    .get(&comp.item_id)
                    .map(|i| i.is_production())
                    .unwrap_or(false);
                if is_production {
                    *accum.entry((stage_id, comp.item_id)).or_insert(0.0) += total;
                }
            }

            // Спуск продолжается независимо от попадания компонента
            // в текущий этап: у дочерних могут быть свои этапы появления
            self.expand_into(comp.item_id, total, accum, path, depth + 1, caches)?;
        }
        path.pop();

        Ok(())
    }
}

/// Чтение метки времени последней синхронизации остатков.
///
/// Формат файла: { "last_sync": "2025-09-19T09:06:38.432061" }.
/// Распознанная метка нормализуется; нераспознанная возвращается как есть
/// (показ сырой строки лучше, чем скрытие даты), отсутствующая - None.
fn read_last_stock_sync(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    let raw = value.get("last_sync")?.as_str()?.trim().to_string();
    if raw.is_empty() {
        return None;
    }
    match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
        Err(_) => Some(raw),
    }
}

// ==========================================
// Единичные тесты
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_last_stock_sync_normalizes_timestamp() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"last_sync": "2025-09-19T09:06:38.432061"}}"#).unwrap();
        let got = read_last_stock_sync(f.path());
        assert_eq!(got.as_deref(), Some("2025-09-19T09:06:38.432061"));
    }

    #[test]
    fn test_read_last_stock_sync_missing_file() {
        assert_eq!(read_last_stock_sync(Path::new("/nonexistent/last_sync_time.json")), None);
    }

    #[test]
    fn test_read_last_stock_sync_empty_value() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"last_sync": ""}}"#).unwrap();
        assert_eq!(read_last_stock_sync(f.path()), None);
    }

    #[test]
    fn test_read_last_stock_sync_passes_through_unparsed() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"last_sync": "вчера"}}"#).unwrap();
        assert_eq!(read_last_stock_sync(f.path()).as_deref(), Some("вчера"));
    }
}
