// ==========================================
// Система производственного планирования - доменный слой
// ==========================================
// Назначение: сущности каталога и узлы дерева развёртки
// Красная линия: без логики доступа к данным, без логики движка
// ==========================================

pub mod catalog;
pub mod tree;

// Реэкспорт основных типов
pub use catalog::{
    DefaultSpecification, Item, Operation, ProductionStage, SpecComponent, SpecOperation,
    Specification, Unit,
};
pub use tree::{
    ComputedValues, ItemRef, NodeType, NodeWarning, OperationRef, SpecTreeNode, StageRef,
};
