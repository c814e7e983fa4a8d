// ==========================================
// Вспомогательные функции тестов
// ==========================================
// Назначение: временная БД каталога, схема и генерация тестовых данных
// ==========================================

use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

use prodplan::app::AppState;
use prodplan::config::AppConfig;

/// Создать временную БД каталога и инициализировать схему
///
/// # Возврат
/// - NamedTempFile: временный файл БД (держать живым до конца теста)
/// - String: путь к файлу БД
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// Открыть обычное соединение с тестовой БД (для заполнения данными)
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(Connection::open(db_path)?)
}

/// Собрать AppState над тестовой БД
pub fn open_state(db_path: &str) -> AppState {
    let config = AppConfig {
        db_path: db_path.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        last_sync_file: None,
    };
    AppState::new(&config).expect("не удалось собрать AppState над тестовой БД")
}

/// Собрать AppState с указанным файлом метки синхронизации
pub fn open_state_with_sync_file(db_path: &str, last_sync_file: &str) -> AppState {
    let config = AppConfig {
        db_path: db_path.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        last_sync_file: Some(std::path::PathBuf::from(last_sync_file)),
    };
    AppState::new(&config).expect("не удалось собрать AppState над тестовой БД")
}

/// Инициализация схемы каталога (зеркало справочников 1С)
fn init_schema(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        INSERT OR IGNORE INTO schema_version (version) VALUES (3);

        CREATE TABLE IF NOT EXISTS production_stages (
            stage_id INTEGER PRIMARY KEY,
            stage_name TEXT NOT NULL UNIQUE,
            stage_order INTEGER,
            stage_ref1c TEXT
        );

        CREATE TABLE IF NOT EXISTS items (
            item_id INTEGER PRIMARY KEY,
            item_code TEXT NOT NULL UNIQUE,
            item_name TEXT NOT NULL,
            item_article TEXT,
            item_ref1c TEXT,
            replenishment_method TEXT,
            unit TEXT,
            stock_qty REAL DEFAULT 0.0,
            status TEXT DEFAULT 'active'
        );

        CREATE TABLE IF NOT EXISTS units (
            unit_id INTEGER PRIMARY KEY,
            unit_ref1c TEXT UNIQUE,
            unit_code TEXT,
            unit_name TEXT,
            unit_full_name TEXT,
            short_name TEXT,
            iso_code TEXT
        );

        CREATE TABLE IF NOT EXISTS specifications (
            spec_id INTEGER PRIMARY KEY,
            spec_code TEXT,
            spec_name TEXT NOT NULL,
            spec_ref1c TEXT
        );

        CREATE TABLE IF NOT EXISTS spec_components (
            component_id INTEGER PRIMARY KEY,
            spec_id INTEGER NOT NULL REFERENCES specifications(spec_id),
            item_id INTEGER NOT NULL REFERENCES items(item_id),
            quantity REAL NOT NULL,
            stage_id INTEGER REFERENCES production_stages(stage_id),
            component_type TEXT DEFAULT 'Материал'
        );

        CREATE TABLE IF NOT EXISTS operations (
            operation_id INTEGER PRIMARY KEY,
            operation_ref1c TEXT,
            operation_name TEXT,
            time_norm REAL
        );

        CREATE TABLE IF NOT EXISTS spec_operations (
            spec_operation_id INTEGER PRIMARY KEY,
            spec_id INTEGER NOT NULL REFERENCES specifications(spec_id),
            operation_id INTEGER NOT NULL REFERENCES operations(operation_id),
            stage_id INTEGER REFERENCES production_stages(stage_id),
            time_norm REAL
        );

        CREATE TABLE IF NOT EXISTS default_specifications (
            id INTEGER PRIMARY KEY,
            item_id INTEGER NOT NULL REFERENCES items(item_id),
            characteristic_id TEXT,
            spec_id INTEGER NOT NULL REFERENCES specifications(spec_id)
        );

        CREATE TABLE IF NOT EXISTS root_products (
            id INTEGER PRIMARY KEY,
            item_id INTEGER NOT NULL UNIQUE REFERENCES items(item_id)
        );
        "#,
    )?;
    Ok(())
}

// ==========================================
// Генерация тестовых данных
// ==========================================

pub fn insert_stage(conn: &Connection, stage_id: i64, name: &str, order: Option<i64>) {
    conn.execute(
        "INSERT INTO production_stages (stage_id, stage_name, stage_order) VALUES (?1, ?2, ?3)",
        params![stage_id, name, order],
    )
    .expect("insert production_stages");
}

pub fn insert_unit(conn: &Connection, unit_id: i64, guid: &str, short_name: &str) {
    conn.execute(
        "INSERT INTO units (unit_id, unit_ref1c, unit_name, short_name) VALUES (?1, ?2, ?3, ?3)",
        params![unit_id, guid, short_name],
    )
    .expect("insert units");
}

#[allow(clippy::too_many_arguments)]
pub fn insert_item(
    conn: &Connection,
    item_id: i64,
    code: &str,
    name: &str,
    replenishment_method: Option<&str>,
    unit_guid: Option<&str>,
    stock_qty: f64,
) {
    conn.execute(
        r#"INSERT INTO items (item_id, item_code, item_name, replenishment_method, unit, stock_qty)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        params![item_id, code, name, replenishment_method, unit_guid, stock_qty],
    )
    .expect("insert items");
}

pub fn set_item_ref1c(conn: &Connection, item_id: i64, guid: &str) {
    conn.execute(
        "UPDATE items SET item_ref1c = ?2 WHERE item_id = ?1",
        params![item_id, guid],
    )
    .expect("update items.item_ref1c");
}

pub fn insert_spec(conn: &Connection, spec_id: i64, code: Option<&str>, name: &str) {
    conn.execute(
        "INSERT INTO specifications (spec_id, spec_code, spec_name) VALUES (?1, ?2, ?3)",
        params![spec_id, code, name],
    )
    .expect("insert specifications");
}

pub fn insert_default_spec(conn: &Connection, item_id: i64, spec_id: i64) {
    conn.execute(
        "INSERT INTO default_specifications (item_id, spec_id) VALUES (?1, ?2)",
        params![item_id, spec_id],
    )
    .expect("insert default_specifications");
}

pub fn insert_default_spec_with_characteristic(
    conn: &Connection,
    item_id: i64,
    characteristic_id: &str,
    spec_id: i64,
) {
    conn.execute(
        "INSERT INTO default_specifications (item_id, characteristic_id, spec_id) VALUES (?1, ?2, ?3)",
        params![item_id, characteristic_id, spec_id],
    )
    .expect("insert default_specifications (characteristic)");
}

pub fn insert_component(
    conn: &Connection,
    spec_id: i64,
    item_id: i64,
    quantity: f64,
    stage_id: Option<i64>,
) {
    conn.execute(
        "INSERT INTO spec_components (spec_id, item_id, quantity, stage_id) VALUES (?1, ?2, ?3, ?4)",
        params![spec_id, item_id, quantity, stage_id],
    )
    .expect("insert spec_components");
}

pub fn insert_operation(
    conn: &Connection,
    operation_id: i64,
    name: Option<&str>,
    time_norm: Option<f64>,
) {
    conn.execute(
        "INSERT INTO operations (operation_id, operation_name, time_norm) VALUES (?1, ?2, ?3)",
        params![operation_id, name, time_norm],
    )
    .expect("insert operations");
}

pub fn insert_spec_operation(
    conn: &Connection,
    spec_operation_id: i64,
    spec_id: i64,
    operation_id: i64,
    time_norm: Option<f64>,
    stage_id: Option<i64>,
) {
    conn.execute(
        r#"INSERT INTO spec_operations (spec_operation_id, spec_id, operation_id, time_norm, stage_id)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
        params![spec_operation_id, spec_id, operation_id, time_norm, stage_id],
    )
    .expect("insert spec_operations");
}

pub fn insert_root_product(conn: &Connection, item_id: i64) {
    conn.execute(
        "INSERT INTO root_products (item_id) VALUES (?1)",
        params![item_id],
    )
    .expect("insert root_products");
}

// ==========================================
// Стандартный набор данных
// ==========================================
// Состав:
//   A (PRD-001, производство, 2 шт на складе)
//     |- B (CMP-001, производство), qty 3, этап не указан  <- NO_STAGE
//     |    |- D (CMP-003, производство), qty 0.5, этап 2 "Мехобработка"
//     |    |- операция 7 "Фрезеровка", норма 1.5, этап 2
//     |- C (CMP-002, закупка), qty 2, этап 1 "Сборка"
//     |- операция 8 (без имени), норма NULL, этап NULL  <- NO_STAGE + NO_TIME_NORM
// Спецификация A - через привязку по умолчанию;
// спецификация B - через резервный подбор по коду (привязки нет)
pub fn seed_standard_catalog(conn: &Connection) {
    insert_stage(conn, 1, "Сборка", Some(1));
    insert_stage(conn, 2, "Мехобработка", Some(2));

    insert_unit(conn, 1, "u-sht", "шт");
    insert_unit(conn, 2, "u-kg", "кг");

    insert_item(conn, 1, "PRD-001", "Изделие А", Some("Производство"), Some("u-sht"), 2.0);
    insert_item(conn, 2, "CMP-001", "Деталь B", Some("Производство"), Some("u-sht"), 12.0);
    insert_item(conn, 3, "CMP-002", "Материал C", Some("Закупка"), Some("u-kg"), 100.0);
    insert_item(conn, 4, "CMP-003", "Деталь D", Some("Производство"), Some("u-sht"), 0.0);

    insert_spec(conn, 100, Some("SPC-100"), "Спецификация А");
    insert_spec(conn, 200, Some("CMP-001"), "Деталь B (состав)");

    // A - через привязку по умолчанию, B - через резервный подбор по коду
    insert_default_spec(conn, 1, 100);

    insert_component(conn, 100, 2, 3.0, None); // B, этап не указан
    insert_component(conn, 100, 3, 2.0, Some(1)); // C
    insert_component(conn, 200, 4, 0.5, Some(2)); // D

    insert_operation(conn, 7, Some("Фрезеровка"), None);
    insert_operation(conn, 8, None, None);

    insert_spec_operation(conn, 15, 200, 7, Some(1.5), Some(2));
    insert_spec_operation(conn, 16, 100, 8, None, None);
}
