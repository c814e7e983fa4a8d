// ==========================================
// Система производственного планирования - основная библиотека
// ==========================================
// Технологии: Rust + SQLite + hyper
// Назначение: ядро развёртки спецификаций (BOM) с читающим HTTP-API;
// каталог (номенклатура, спецификации, этапы, ЕИ) зеркалируется
// из 1С контуром синхронизации и здесь ТОЛЬКО читается
// ==========================================

// ==========================================
// Объявление модулей
// ==========================================

// Доменный слой - сущности и типы
pub mod domain;

// Слой хранения - доступ к каталогу (только чтение)
pub mod repository;

// Слой движка - развёртка спецификаций
pub mod engine;

// Слой конфигурации
pub mod config;

// Инфраструктура БД (инициализация соединений / единые PRAGMA)
pub mod db;

// Журналирование
pub mod logging;

// Слой API - бизнес-интерфейсы чтения
pub mod api;

// Прикладной слой - сборка состояния и HTTP
pub mod app;

// ==========================================
// Реэкспорт основных типов
// ==========================================

// Доменные типы
pub use domain::{
    DefaultSpecification, Item, NodeType, NodeWarning, Operation, ProductionStage, SpecComponent,
    SpecOperation, SpecTreeNode, Specification, Unit,
};

// Движки
pub use engine::{SpecResolver, StageRollupEngine, TreeAssembler, UnitMap};

// API
pub use api::{SpecificationApi, StagesApi};

// ==========================================
// Константы
// ==========================================

// Версия системы
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Название системы
pub const APP_NAME: &str = "Система производственного планирования";

// ==========================================
// Проверка сборки
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
