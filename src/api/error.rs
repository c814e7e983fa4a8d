// ==========================================
// Система производственного планирования - ошибки слоя API
// ==========================================
// Назначение: таксономия ошибок чтения и преобразование ошибок
//             слоя хранения в понятные клиенту
// Политика: некорректный запрос отклоняется ДО обращения к каталогу;
// предупреждения качества данных (NO_STAGE и пр.) ошибками не являются
// и живут в warnings узла
// ==========================================

use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки слоя API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Не передан обязательный идентифицирующий параметр
    #[error("некорректный запрос: {0}")]
    InvalidInput(String),

    /// Изделие или узел не найдены; повтор запроса не поможет
    #[error("не найдено: {0}")]
    NotFound(String),

    /// Числовой параметр вне допустимого диапазона
    #[error("значение вне диапазона: {0}")]
    OutOfRange(String),

    /// Каталог недоступен; ошибка транзиентная, клиент может повторить
    /// запрос целиком (чтение идемпотентно)
    #[error("каталог недоступен: {0}")]
    CatalogUnavailable(String),

    #[error("внутренняя ошибка: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Стабильный код ошибки для клиента
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::OutOfRange(_) => "OUT_OF_RANGE",
            ApiError::CatalogUnavailable(_) => "CATALOG_UNAVAILABLE",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// Соответствующий HTTP-статус
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::OutOfRange(_) => 422,
            ApiError::CatalogUnavailable(_) => 503,
            ApiError::InternalError(_) | ApiError::Other(_) => 500,
        }
    }
}

// Преобразование технических ошибок слоя хранения в ошибки API
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} (id={id}) не существует"))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::CatalogUnavailable(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Псевдоним Result для слоя API
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// Конверт ошибки (тело HTTP-ответа)
// ==========================================

/// Ответ с ошибкой (возвращается клиенту)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Код ошибки
    pub code: String,
    /// Сообщение об ошибке
    pub message: String,
}

impl ErrorResponse {
    pub fn from_error(err: &ApiError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ApiError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::OutOfRange("x".into()).status_code(), 422);
        assert_eq!(ApiError::CatalogUnavailable("x".into()).status_code(), 503);
        assert_eq!(ApiError::InternalError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Item".to_string(),
            id: "42".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Item"));
                assert!(msg.contains("42"));
            }
            _ => panic!("ожидалась NotFound"),
        }

        let repo_err = RepositoryError::DatabaseQueryError("database is locked".to_string());
        let api_err: ApiError = repo_err.into();
        assert_eq!(api_err.status_code(), 503, "ошибка чтения каталога транзиентна");
    }

    #[test]
    fn test_error_response_envelope() {
        let err = ApiError::OutOfRange("root_qty должно быть > 0".to_string());
        let body = ErrorResponse::from_error(&err);
        assert_eq!(body.code, "OUT_OF_RANGE");
        assert!(body.message.contains("root_qty"));
    }
}
