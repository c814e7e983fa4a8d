// ==========================================
// Система производственного планирования - репозиторий спецификаций
// ==========================================
// Назначение: чтение спецификаций, их составов и операций,
//             а также привязок "спецификация по умолчанию"
// Все запросы - только чтение; порядок строк детерминирован
// (ORDER BY по первичному ключу), чтобы развёртка была воспроизводимой
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::catalog::{
    DefaultSpecification, Item, Operation, ProductionStage, SpecComponent, SpecOperation,
};
use crate::repository::error::{RepositoryError, RepositoryResult};

/// Строка состава вместе с дочерней номенклатурой и этапом (join)
#[derive(Debug, Clone)]
pub struct ComponentRow {
    pub component: SpecComponent,
    pub item: Item,
    pub stage: Option<ProductionStage>,
}

/// Строка операций вместе с навигационным справочником и этапом (join)
#[derive(Debug, Clone)]
pub struct OperationRow {
    pub spec_operation: SpecOperation,
    pub operation: Operation,
    pub stage: Option<ProductionStage>,
}

/// Репозиторий спецификаций
pub struct SpecificationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SpecificationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Спецификация по умолчанию для (изделие, характеристика).
    ///
    /// Детерминированный выбор при нескольких привязках:
    /// 1) точное совпадение характеристики;
    /// 2) привязка без характеристики;
    /// 3) наименьший id привязки.
    pub fn default_spec_for(
        &self,
        item_id: i64,
        characteristic_id: Option<&str>,
    ) -> RepositoryResult<Option<i64>> {
        let conn = self.lock()?;
        let spec_id: Option<i64> = conn
            .query_row(
                r#"SELECT spec_id
                   FROM default_specifications
                   WHERE item_id = ?1
                   ORDER BY CASE
                       WHEN characteristic_id = ?2 THEN 0
                       WHEN characteristic_id IS NULL THEN 1
                       ELSE 2
                   END, id
                   LIMIT 1"#,
                params![item_id, characteristic_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(spec_id)
    }

    /// Резервный подбор спецификации по совпадению кода или наименования.
    ///
    /// Некоторые каталоги не заполняют привязки по умолчанию, но называют
    /// спецификацию так же, как изделие. Подбор срабатывает только при
    /// РОВНО одном совпадении: неоднозначность деградирует в "листовой узел".
    pub fn find_unique_by_code_or_name(
        &self,
        item_code: &str,
        item_name: &str,
    ) -> RepositoryResult<Option<i64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT spec_id FROM specifications WHERE spec_code = ?1 OR spec_name = ?2",
        )?;
        let ids = stmt
            .query_map(params![item_code, item_name], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        match ids.as_slice() {
            [single] => Ok(Some(*single)),
            [] => Ok(None),
            many => {
                tracing::debug!(
                    item_code = item_code,
                    matches = many.len(),
                    "резервный подбор спецификации неоднозначен, трактуем как лист"
                );
                Ok(None)
            }
        }
    }

    /// Есть ли у спецификации хотя бы одна строка состава или операций
    pub fn has_rows(&self, spec_id: i64) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let has: bool = conn.query_row(
            r#"SELECT EXISTS(SELECT 1 FROM spec_components WHERE spec_id = ?1)
                   OR EXISTS(SELECT 1 FROM spec_operations WHERE spec_id = ?1)"#,
            params![spec_id],
            |row| row.get(0),
        )?;
        Ok(has)
    }

    fn map_stage(row: &Row<'_>, base: usize) -> rusqlite::Result<Option<ProductionStage>> {
        let stage_id: Option<i64> = row.get(base)?;
        Ok(match stage_id {
            Some(stage_id) => Some(ProductionStage {
                stage_id,
                stage_name: row.get::<_, Option<String>>(base + 1)?.unwrap_or_default(),
                stage_order: row.get(base + 2)?,
            }),
            None => None,
        })
    }

    /// Строки состава спецификации вместе с дочерней номенклатурой и этапом
    pub fn components_with_items(&self, spec_id: i64) -> RepositoryResult<Vec<ComponentRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"SELECT c.component_id, c.spec_id, c.item_id, c.quantity, c.stage_id, c.component_type,
                      i.item_code, i.item_name, i.item_article, i.item_ref1c,
                      i.replenishment_method, i.unit, COALESCE(i.stock_qty, 0.0),
                      s.stage_id, s.stage_name, s.stage_order
               FROM spec_components c
               JOIN items i ON i.item_id = c.item_id
               LEFT JOIN production_stages s ON s.stage_id = c.stage_id
               WHERE c.spec_id = ?1
               ORDER BY c.component_id"#,
        )?;
        let rows = stmt
            .query_map(params![spec_id], |row| {
                Ok(ComponentRow {
                    component: SpecComponent {
                        component_id: row.get(0)?,
                        spec_id: row.get(1)?,
                        item_id: row.get(2)?,
                        quantity: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                        stage_id: row.get(4)?,
                        component_type: row.get(5)?,
                    },
                    item: Item {
                        item_id: row.get(2)?,
                        item_code: row.get(6)?,
                        item_name: row.get(7)?,
                        item_article: row.get(8)?,
                        item_ref1c: row.get(9)?,
                        replenishment_method: row.get(10)?,
                        unit: row.get(11)?,
                        stock_qty: row.get(12)?,
                    },
                    stage: Self::map_stage(row, 13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Строки операций спецификации вместе с навигационным именем и этапом
    pub fn operations_with_names(&self, spec_id: i64) -> RepositoryResult<Vec<OperationRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"SELECT so.spec_operation_id, so.spec_id, so.operation_id, so.time_norm, so.stage_id,
                      o.operation_name, o.time_norm,
                      s.stage_id, s.stage_name, s.stage_order
               FROM spec_operations so
               JOIN operations o ON o.operation_id = so.operation_id
               LEFT JOIN production_stages s ON s.stage_id = so.stage_id
               WHERE so.spec_id = ?1
               ORDER BY so.spec_operation_id"#,
        )?;
        let rows = stmt
            .query_map(params![spec_id], |row| {
                Ok(OperationRow {
                    spec_operation: SpecOperation {
                        spec_operation_id: row.get(0)?,
                        spec_id: row.get(1)?,
                        operation_id: row.get(2)?,
                        time_norm: row.get(3)?,
                        stage_id: row.get(4)?,
                    },
                    operation: Operation {
                        operation_id: row.get(2)?,
                        operation_name: row.get(5)?,
                        time_norm: row.get(6)?,
                    },
                    stage: Self::map_stage(row, 7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Строки состава без join (кэш сводного расчёта по этапам)
    pub fn components_of(&self, spec_id: i64) -> RepositoryResult<Vec<SpecComponent>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"SELECT component_id, spec_id, item_id, quantity, stage_id, component_type
               FROM spec_components
               WHERE spec_id = ?1
               ORDER BY component_id"#,
        )?;
        let rows = stmt
            .query_map(params![spec_id], |row| {
                Ok(SpecComponent {
                    component_id: row.get(0)?,
                    spec_id: row.get(1)?,
                    item_id: row.get(2)?,
                    quantity: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                    stage_id: row.get(4)?,
                    component_type: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Все привязки "спецификация по умолчанию" (кэш сводного расчёта)
    pub fn list_default_bindings(&self) -> RepositoryResult<Vec<DefaultSpecification>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, item_id, characteristic_id, spec_id FROM default_specifications ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DefaultSpecification {
                    id: row.get(0)?,
                    item_id: row.get(1)?,
                    characteristic_id: row.get(2)?,
                    spec_id: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
