// ==========================================
// Система производственного планирования - инициализация SQLite
// ==========================================
// Цели:
// - единое поведение PRAGMA для всех Connection::open (иначе часть
//   модулей работает с включёнными внешними ключами, часть - без);
// - единый busy_timeout, чтобы параллельные чтения при активной
//   синхронизации каталога не падали со случайным busy
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// busy_timeout по умолчанию (мс)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Версия схемы, которую ожидает этот код.
///
/// Схемой владеет контур синхронизации каталога; здесь версия
/// используется только для предупреждения при запуске (автомиграций нет),
/// чтобы не работать молча на устаревшей базе.
pub const CURRENT_SCHEMA_VERSION: i64 = 3;

/// Единые PRAGMA для соединения SQLite.
///
/// foreign_keys и busy_timeout настраиваются на КАЖДОЕ соединение.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Открыть соединение SQLite с единой конфигурацией
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Прочитать schema_version (None, если таблицы нет)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
