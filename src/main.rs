// ==========================================
// Система производственного планирования - входная точка сервера
// ==========================================
// Технологии: Rust + SQLite + hyper
// ==========================================

use std::net::SocketAddr;
use std::sync::Arc;

use prodplan::app::{http, AppState};
use prodplan::config::AppConfig;
use prodplan::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация журналирования
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", prodplan::APP_NAME);
    tracing::info!("версия: {}", prodplan::VERSION);
    tracing::info!("==================================================");

    // Настройки процесса
    let config = AppConfig::from_env();
    tracing::info!("БД каталога: {}", config.db_path);

    // Сборка состояния приложения
    tracing::info!("инициализация AppState...");
    let state = AppState::new(&config)
        .map_err(|e| anyhow::anyhow!("не удалось инициализировать AppState: {e}"))?;

    // Запуск HTTP-сервера
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("некорректный адрес '{}': {e}", config.bind_addr))?;

    http::serve(Arc::new(state), addr).await?;

    tracing::info!("сервер остановлен");
    Ok(())
}
