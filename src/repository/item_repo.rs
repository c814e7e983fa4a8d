// ==========================================
// Система производственного планирования - репозиторий номенклатуры
// ==========================================
// Назначение: чтение справочника items (зеркало каталога 1С)
// Движок развёртки не изменяет номенклатуру: записи создаются
// и обновляются только заданиями синхронизации
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::domain::catalog::Item;
use crate::repository::error::{RepositoryError, RepositoryResult};

const ITEM_COLUMNS: &str = "item_id, item_code, item_name, item_article, item_ref1c, \
     replenishment_method, unit, COALESCE(stock_qty, 0.0)";

/// Универсальный селектор изделия из параметров запроса.
///
/// Приоритет поиска: GUID из 1С -> внутренний ID -> внешний код.
#[derive(Debug, Clone, Default)]
pub struct ItemSelector {
    pub item_id: Option<i64>,
    pub item_code: Option<String>,
    pub item_ref1c: Option<String>,
}

impl ItemSelector {
    /// Селектор пуст, если не задан ни один из идентификаторов
    /// (GUID считается заданным только непустым).
    pub fn is_empty(&self) -> bool {
        self.item_id.is_none()
            && self.item_code.is_none()
            && self
                .item_ref1c
                .as_deref()
                .map(|s| s.trim().is_empty())
                .unwrap_or(true)
    }
}

/// Репозиторий номенклатуры
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_item(row: &Row<'_>) -> rusqlite::Result<Item> {
        Ok(Item {
            item_id: row.get(0)?,
            item_code: row.get(1)?,
            item_name: row.get(2)?,
            item_article: row.get(3)?,
            item_ref1c: row.get(4)?,
            replenishment_method: row.get(5)?,
            unit: row.get(6)?,
            stock_qty: row.get(7)?,
        })
    }

    /// Поиск по внутреннему ID
    pub fn find_by_id(&self, item_id: i64) -> RepositoryResult<Option<Item>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = ?1");
        let item = conn
            .query_row(&sql, params![item_id], Self::map_item)
            .optional()?;
        Ok(item)
    }

    /// Поиск по внешнему коду номенклатуры
    pub fn find_by_code(&self, item_code: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_code = ?1");
        let item = conn
            .query_row(&sql, params![item_code.trim()], Self::map_item)
            .optional()?;
        Ok(item)
    }

    /// Поиск по GUID из 1С (Ref_Key)
    pub fn find_by_ref1c(&self, item_ref1c: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_ref1c = ?1");
        let item = conn
            .query_row(&sql, params![item_ref1c.trim()], Self::map_item)
            .optional()?;
        Ok(item)
    }

    /// Универсальный поиск изделия по селектору.
    ///
    /// Порядок: GUID из 1С (приоритетно, если передан) -> item_id -> item_code.
    /// Возвращает None, если ничего не найдено, - решение о статусе 404
    /// принимает слой API.
    pub fn find_by_selector(&self, selector: &ItemSelector) -> RepositoryResult<Option<Item>> {
        if let Some(guid) = selector.item_ref1c.as_deref() {
            let guid = guid.trim();
            if !guid.is_empty() {
                if let Some(item) = self.find_by_ref1c(guid)? {
                    return Ok(Some(item));
                }
            }
        }
        if let Some(item_id) = selector.item_id {
            if let Some(item) = self.find_by_id(item_id)? {
                return Ok(Some(item));
            }
        }
        if let Some(code) = selector.item_code.as_deref() {
            if let Some(item) = self.find_by_code(code)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Вся номенклатура (кэш для сводного расчёта по этапам)
    pub fn list_all(&self) -> RepositoryResult<Vec<Item>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY item_id");
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([], Self::map_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}
