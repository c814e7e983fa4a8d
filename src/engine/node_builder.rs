// ==========================================
// Система производственного планирования - построители узлов
// ==========================================
// Назначение: чистые функции "строка каталога + контекст предков -> узел".
// Построители не знают о режиме обхода (ленивый/полный): оба режима -
// тонкие драйверы над этим ядром, что и гарантирует совпадение
// идентификаторов и вычисленных полей
// ==========================================

use crate::domain::catalog::{Item, Operation, ProductionStage, SpecComponent, SpecOperation};
use crate::domain::tree::{
    ComputedValues, ItemRef, NodeType, NodeWarning, OperationRef, SpecTreeNode, StageRef,
};
use crate::engine::node_id::{canon_qty, NodeId};

/// Округление до заданного числа знаков после запятой
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn stage_ref(stage: Option<&ProductionStage>) -> Option<StageRef> {
    stage.map(|s| StageRef {
        id: s.stage_id.to_string(),
        name: s.stage_name.clone(),
    })
}

/// Построение узла номенклатуры.
///
/// - `component` - строка состава, по которой изделие попало в дерево
///   (None для корня: у корня нет строки состава и нет этапа);
/// - `ancestor_qty` - накопленное количество родителя (для корня -
///   количество из запроса);
/// - `path` - путь предков от корня (упорядоченный список item_id,
///   БЕЗ самого изделия).
///
/// Вычисляет: treeQty = ancestor_qty * qty_per_parent (канонизация до
/// 6 знаков, отображение с округлением до 3), предупреждения NO_STAGE и
/// CYCLE_DETECTED. Узел с циклом эмитируется, но помечается
/// неразворачиваемым (hasChildren = false).
#[allow(clippy::too_many_arguments)]
pub fn build_item_node(
    item: &Item,
    component: Option<&SpecComponent>,
    stage: Option<&ProductionStage>,
    parent_id: Option<&str>,
    ancestor_qty: f64,
    path: &[i64],
    unit_label: Option<String>,
    spec_has_rows: bool,
) -> SpecTreeNode {
    let qty_per_parent = component.map(|c| c.quantity);
    let tree_qty = canon_qty(ancestor_qty * qty_per_parent.unwrap_or(1.0));

    let in_cycle = path.contains(&item.item_id);

    let mut warnings = Vec::new();
    if let Some(component) = component {
        if component.stage_id.is_none() {
            warnings.push(NodeWarning::NoStage);
        }
    }
    if in_cycle {
        warnings.push(NodeWarning::CycleDetected);
    }

    let id = NodeId::Item {
        item_id: item.item_id,
        tree_qty,
        qty_per_parent: qty_per_parent.unwrap_or(1.0),
        path: path.to_vec(),
    }
    .encode();

    SpecTreeNode {
        id,
        parent_id: parent_id.map(|s| s.to_string()),
        node_type: NodeType::Item,
        name: Some(item.item_name.clone()),
        article: item.item_article.clone().filter(|a| !a.is_empty()),
        stage: stage_ref(stage),
        operation: None,
        qty_per_parent: qty_per_parent.map(|q| round_to(q, 3)),
        unit: unit_label,
        replenishment_method: item
            .replenishment_method
            .as_deref()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        time_norm_nh: None,
        computed: ComputedValues {
            tree_qty: Some(round_to(tree_qty, 3)),
            tree_time_nh: None,
        },
        has_children: spec_has_rows && !in_cycle,
        warnings,
        item: Some(ItemRef {
            id: item.item_id,
            code: item.item_code.clone(),
        }),
        children: None,
    }
}

/// Построение узла операции.
///
/// Норма времени определена на единицу НЕПОСРЕДСТВЕННОГО родителя:
/// treeTimeNh = норма * parent_local_qty (локальный множитель родителя,
/// 1 для корня), округление до 2 знаков. Подстановка накопленного
/// treeQty родителя здесь была бы ошибкой.
///
/// Источник нормы: строка spec_operations, при NULL - навигационный
/// справочник operations. Отсутствующая и нулевая нормы не различаются:
/// обе дают NO_TIME_NORM (каталожная выгрузка заполняет пустые нормы
/// нулями, так что различие в данных не наблюдаемо).
#[allow(clippy::too_many_arguments)]
pub fn build_operation_node(
    spec_operation: &SpecOperation,
    operation: &Operation,
    stage: Option<&ProductionStage>,
    parent_id: &str,
    parent_item: &Item,
    parent_tree_qty: f64,
    parent_local_qty: f64,
    path: &[i64],
) -> SpecTreeNode {
    let effective_norm = spec_operation.time_norm.or(operation.time_norm);
    let time_norm = effective_norm.unwrap_or(0.0);

    let mut warnings = Vec::new();
    if spec_operation.stage_id.is_none() {
        warnings.push(NodeWarning::NoStage);
    }
    if time_norm <= 0.0 {
        warnings.push(NodeWarning::NoTimeNorm);
    }

    let id = NodeId::Operation {
        spec_operation_id: spec_operation.spec_operation_id,
        parent_item_id: parent_item.item_id,
        parent_tree_qty,
        path: path.to_vec(),
    }
    .encode();

    SpecTreeNode {
        id,
        parent_id: Some(parent_id.to_string()),
        node_type: NodeType::Operation,
        name: None,
        article: None,
        stage: stage_ref(stage),
        operation: Some(OperationRef {
            id: Some(operation.operation_id.to_string()),
            name: operation.operation_name.clone(),
        }),
        qty_per_parent: None,
        unit: None,
        replenishment_method: None,
        time_norm_nh: Some(round_to(time_norm, 3)),
        computed: ComputedValues {
            tree_qty: None,
            tree_time_nh: Some(round_to(time_norm * parent_local_qty, 2)),
        },
        has_children: false,
        warnings,
        item: Some(ItemRef {
            id: parent_item.item_id,
            code: parent_item.item_code.clone(),
        }),
        children: None,
    }
}
