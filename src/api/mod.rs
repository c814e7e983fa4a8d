// ==========================================
// Система производственного планирования - слой API
// ==========================================
// Назначение: бизнес-интерфейсы чтения, вызываемые HTTP-слоем
// ==========================================

pub mod error;
pub mod specification_api;
pub mod stages_api;

// Реэкспорт основных типов
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use specification_api::{
    FullQuery, RequestedParams, SpecificationApi, TreeMeta, TreeQuery, TreeResponse,
};
pub use stages_api::StagesApi;
