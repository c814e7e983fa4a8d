// ==========================================
// Система производственного планирования - ошибки слоя хранения
// ==========================================
// Инструмент: derive-макрос thiserror
// Слой каталога только читает, поэтому набор ошибок
// ограничен ошибками чтения
// ==========================================

use thiserror::Error;

/// Ошибки слоя хранения (каталог, только чтение)
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("запись не найдена: {entity} с id={id}")]
    NotFound { entity: String, id: String },

    #[error("не удалось открыть базу данных: {0}")]
    DatabaseConnectionError(String),

    #[error("не удалось захватить блокировку соединения: {0}")]
    LockError(String),

    #[error("ошибка запроса к базе данных: {0}")]
    DatabaseQueryError(String),

    #[error("внутренняя ошибка: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Псевдоним Result для слоя хранения
pub type RepositoryResult<T> = Result<T, RepositoryError>;
