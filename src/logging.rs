// ==========================================
// Инициализация журналирования
// ==========================================
// Используются tracing и tracing-subscriber;
// уровень настраивается переменной окружения
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Инициализация журналирования
///
/// # Переменные окружения
/// - RUST_LOG: фильтр уровня (по умолчанию: info)
///   например: RUST_LOG=debug или RUST_LOG=prodplan=trace
///
/// # Пример
/// ```no_run
/// use prodplan::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Инициализация журналирования в тестах
///
/// Более подробный уровень, вывод через test_writer
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
