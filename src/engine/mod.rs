// ==========================================
// Система производственного планирования - слой движка
// ==========================================
// Назначение: алгоритмическое ядро развёртки спецификаций
// Красная линия: движок не изменяет каталог; обнаружение циклов
// относительно пути, а не глобально
// ==========================================

pub mod assembler;
pub mod node_builder;
pub mod node_id;
pub mod resolver;
pub mod stage_rollup;
pub mod units;

// Реэкспорт основных типов движка
pub use assembler::{TreeAssembler, DEFAULT_MAX_DEPTH, MAX_MAX_DEPTH, MIN_MAX_DEPTH};
pub use node_builder::{build_item_node, build_operation_node, round_to};
pub use node_id::{canon_qty, NodeId};
pub use resolver::SpecResolver;
pub use stage_rollup::{
    StageBlock, StageCalcResult, StageComponentOut, StageProductBlock, StageRollupEngine,
};
pub use units::UnitMap;
