// ==========================================
// Система производственного планирования - репозиторий этапов производства
// ==========================================
// Назначение: чтение справочника production_stages
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::domain::catalog::ProductionStage;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// Репозиторий этапов производства
pub struct StageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StageRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Все этапы производства
    pub fn list_all(&self) -> RepositoryResult<Vec<ProductionStage>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT stage_id, stage_name, stage_order FROM production_stages ORDER BY stage_id",
        )?;
        let stages = stmt
            .query_map([], |row| {
                Ok(ProductionStage {
                    stage_id: row.get(0)?,
                    stage_name: row.get(1)?,
                    stage_order: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stages)
    }
}
