// ==========================================
// Система производственного планирования - репозиторий единиц измерения
// ==========================================
// Назначение: чтение справочника units для словаря GUID -> обозначение
// Словарь строится один раз на запрос (engine::units), а не на узел
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::domain::catalog::Unit;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// Репозиторий единиц измерения
pub struct UnitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UnitRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Весь справочник ЕИ
    pub fn list_all(&self) -> RepositoryResult<Vec<Unit>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut stmt = conn.prepare(
            r#"SELECT unit_id, unit_ref1c, unit_code, unit_name, short_name, iso_code
               FROM units
               ORDER BY unit_id"#,
        )?;
        let units = stmt
            .query_map([], |row| {
                Ok(Unit {
                    unit_id: row.get(0)?,
                    unit_ref1c: row.get(1)?,
                    unit_code: row.get(2)?,
                    unit_name: row.get(3)?,
                    short_name: row.get(4)?,
                    iso_code: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(units)
    }
}
