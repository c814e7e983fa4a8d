// ==========================================
// Система производственного планирования - репозиторий плана выпуска
// ==========================================
// Назначение: чтение строк плана (root_products) - корневых изделий
//             для сводного расчёта по этапам производства
// Сам план редактируется другим контуром приложения; движок только читает
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::repository::error::{RepositoryError, RepositoryResult};

/// Репозиторий строк плана выпуска
pub struct PlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// ID корневых изделий плана выпуска
    pub fn list_root_product_item_ids(&self) -> RepositoryResult<Vec<i64>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut stmt = conn.prepare("SELECT item_id FROM root_products ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
