// ==========================================
// Система производственного планирования - узлы дерева спецификации
// ==========================================
// Назначение: выходной формат развёртки (общий для ленивого и полного
//             режимов); сериализуется в camelCase для фронтенда (QTable tree)
// Узлы не персистентны: каждое обращение пересчитывает их
// из текущего состояния каталога
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// NodeType - тип узла
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Item,      // номенклатура (компонент состава)
    Operation, // операция (строка операций спецификации)
}

// ==========================================
// NodeWarning - предупреждение качества данных
// ==========================================
// Предупреждение прикрепляется к узлу и никогда не прерывает запрос
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeWarning {
    /// У строки состава/операции не указан этап производства
    #[serde(rename = "NO_STAGE")]
    NoStage,
    /// Норма времени отсутствует или нулевая
    #[serde(rename = "NO_TIME_NORM")]
    NoTimeNorm,
    /// Номенклатура уже встречалась на пути от корня (цикл в составе)
    #[serde(rename = "CYCLE_DETECTED")]
    CycleDetected,
}

/// Ссылка на этап производства в узле
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRef {
    pub id: String,
    pub name: String,
}

/// Ссылка на операцию в узле (только для type=operation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Ссылка на номенклатуру узла (используется ленивой подгрузкой детей)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: i64,
    pub code: String,
}

/// Вычисленные поля узла
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedValues {
    /// Количество, накопленное от корня (3 знака); только для type=item
    pub tree_qty: Option<f64>,
    /// Нормо-часы = норма * ЛОКАЛЬНЫЙ множитель родителя (2 знака);
    /// только для type=operation
    pub tree_time_nh: Option<f64>,
}

// ==========================================
// SpecTreeNode - узел дерева спецификации
// ==========================================
// Идентичность узла детерминирована от (сущность, накопленное
// количество, путь предков) - см. engine::node_id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecTreeNode {
    pub id: String,
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: Option<String>,
    pub article: Option<String>,
    pub stage: Option<StageRef>,
    pub operation: Option<OperationRef>,
    pub qty_per_parent: Option<f64>,
    pub unit: Option<String>,
    pub replenishment_method: Option<String>,
    pub time_norm_nh: Option<f64>,
    pub computed: ComputedValues,
    pub has_children: bool,
    pub warnings: Vec<NodeWarning>,
    pub item: Option<ItemRef>,
    /// Заполняется только полным режимом (и предразворотом первого уровня)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SpecTreeNode>>,
}

impl SpecTreeNode {
    /// Все узлы поддерева, включая сам узел (обход в глубину).
    ///
    /// Используется проверкой эквивалентности ленивого и полного режимов.
    pub fn walk(&self) -> Vec<&SpecTreeNode> {
        let mut out = vec![self];
        if let Some(children) = &self.children {
            for ch in children {
                out.extend(ch.walk());
            }
        }
        out
    }
}
