// ==========================================
// Система производственного планирования - слой хранения
// ==========================================
// Красная линия: Repository не содержит бизнес-логики
// ==========================================
// Назначение: доступ к каталогу (только чтение), скрытие деталей БД
// Ограничение: все запросы параметризованы
// ==========================================

pub mod error;
pub mod item_repo;
pub mod plan_repo;
pub mod spec_repo;
pub mod stage_repo;
pub mod unit_repo;

// Реэкспорт основных репозиториев
pub use error::{RepositoryError, RepositoryResult};
pub use item_repo::{ItemRepository, ItemSelector};
pub use plan_repo::PlanRepository;
pub use spec_repo::{ComponentRow, OperationRow, SpecificationRepository};
pub use stage_repo::StageRepository;
pub use unit_repo::UnitRepository;
