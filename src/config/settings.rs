// ==========================================
// Система производственного планирования - настройки процесса
// ==========================================
// Источники (по убыванию приоритета):
// - переменные окружения PRODPLAN_DB_PATH / PRODPLAN_BIND /
//   PRODPLAN_LAST_SYNC_FILE (удобно для отладки, тестов и CI);
// - каталог данных пользователя (dirs), с раздельными путями
//   для отладочной и боевой сборки
// ==========================================

use std::path::PathBuf;

/// Адрес HTTP-сервера по умолчанию
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Файл метки последней синхронизации остатков
/// (совместимость с прежним развёртыванием)
pub const DEFAULT_LAST_SYNC_FILE: &str = "config/last_sync_time.json";

/// Настройки процесса
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Путь к файлу БД каталога
    pub db_path: String,
    /// Адрес прослушивания HTTP-сервера
    pub bind_addr: String,
    /// Файл метки последней синхронизации остатков (None - не читать)
    pub last_sync_file: Option<PathBuf>,
}

impl AppConfig {
    /// Сборка настроек из окружения с разумными значениями по умолчанию
    pub fn from_env() -> Self {
        let db_path = match std::env::var("PRODPLAN_DB_PATH") {
            Ok(path) if !path.trim().is_empty() => path.trim().to_string(),
            _ => default_db_path(),
        };

        let bind_addr = match std::env::var("PRODPLAN_BIND") {
            Ok(addr) if !addr.trim().is_empty() => addr.trim().to_string(),
            _ => DEFAULT_BIND_ADDR.to_string(),
        };

        let last_sync_file = match std::env::var("PRODPLAN_LAST_SYNC_FILE") {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path.trim())),
            _ => Some(PathBuf::from(DEFAULT_LAST_SYNC_FILE)),
        };

        Self {
            db_path,
            bind_addr,
            last_sync_file,
        }
    }
}

/// Путь к БД каталога по умолчанию.
///
/// Используется каталог данных пользователя, чтобы файл БД не жил
/// в рабочем каталоге процесса; в отладочной сборке - отдельный
/// подкаталог, чтобы не трогать боевые данные.
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./prodplan.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("prodplan-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("prodplan");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("prodplan.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_not_empty() {
        let path = default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
