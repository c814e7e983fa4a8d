// ==========================================
// Система производственного планирования - сборщик дерева спецификации
// ==========================================
// Назначение: два контракта обхода над одним ядром построения узлов:
//   - ленивый: корень отдельно, дети по требованию (одно поколение
//     на вызов, для произвольно больших составов);
//   - полный: немедленная рекурсия до ограничения глубины.
// Обнаружение циклов ОТНОСИТЕЛЬНО ПУТИ (не глобально): проверяется
// членство изделия в пути предков текущей ветки.
// Жёсткий контракт: идентификаторы и вычисленные поля узлов полного
// режима совпадают с результатом последовательности ленивых разворотов
// над теми же входами
// ==========================================

use std::sync::Arc;

use crate::domain::catalog::Item;
use crate::domain::tree::{NodeType, NodeWarning, SpecTreeNode};
use crate::engine::node_builder::{build_item_node, build_operation_node};
use crate::engine::node_id::NodeId;
use crate::engine::resolver::SpecResolver;
use crate::engine::units::UnitMap;
use crate::repository::{ItemRepository, RepositoryResult, SpecificationRepository};

/// Глубина полного разворота по умолчанию
pub const DEFAULT_MAX_DEPTH: i64 = 15;
/// Допустимый диапазон глубины полного разворота
pub const MIN_MAX_DEPTH: i64 = 1;
pub const MAX_MAX_DEPTH: i64 = 50;

/// Сборщик дерева спецификации
pub struct TreeAssembler {
    items: Arc<ItemRepository>,
    specs: Arc<SpecificationRepository>,
    resolver: Arc<SpecResolver>,
}

impl TreeAssembler {
    pub fn new(
        items: Arc<ItemRepository>,
        specs: Arc<SpecificationRepository>,
        resolver: Arc<SpecResolver>,
    ) -> Self {
        Self {
            items,
            specs,
            resolver,
        }
    }

    /// Корневой узел (ленивый режим: дети не материализуются).
    ///
    /// У корня qty_per_parent = 1, накопленное количество равно
    /// количеству из запроса, этап не заполняется.
    pub fn root_node(
        &self,
        item: &Item,
        root_qty: f64,
        units: &UnitMap,
    ) -> RepositoryResult<SpecTreeNode> {
        let has_rows = self.resolver.has_children(item.item_id)?;
        Ok(build_item_node(
            item,
            None,
            None,
            None,
            root_qty,
            &[],
            units.label(item.unit.as_deref()),
            has_rows,
        ))
    }

    /// Одно поколение детей разобранного узла (ленивый режим).
    ///
    /// Порядок фиксирован: сначала компоненты состава, затем операции, -
    /// для предсказуемой раскладки в интерфейсе. Узел операции и узел
    /// с обнаруженным циклом детей не имеют.
    pub fn expand(
        &self,
        parent: &NodeId,
        include_operations: bool,
        units: &UnitMap,
    ) -> RepositoryResult<Vec<SpecTreeNode>> {
        match parent {
            NodeId::Item {
                item_id,
                tree_qty,
                qty_per_parent,
                path,
            } => {
                if path.contains(item_id) {
                    // Узел цикла: разворот останавливается на этой ветке
                    return Ok(Vec::new());
                }
                self.children_for(
                    *item_id,
                    *tree_qty,
                    *qty_per_parent,
                    path,
                    &parent.encode(),
                    include_operations,
                    units,
                )
            }
            NodeId::Operation { .. } => Ok(Vec::new()),
        }
    }

    /// Полное дерево с немедленной рекурсией, ограниченной глубиной.
    ///
    /// `max_depth` зажимается в допустимый диапазон (граница HTTP
    /// дополнительно отклоняет значения вне диапазона до обращения
    /// к каталогу). Корень имеет глубину 0; узлы глубже max_depth
    /// не эмитируются. Усечение по глубине - штатное поведение,
    /// предупреждением не помечается.
    pub fn full_tree(
        &self,
        item: &Item,
        root_qty: f64,
        max_depth: i64,
        units: &UnitMap,
    ) -> RepositoryResult<SpecTreeNode> {
        let depth_limit = max_depth.clamp(MIN_MAX_DEPTH, MAX_MAX_DEPTH);
        let mut root = self.root_node(item, root_qty, units)?;
        self.recurse(&mut root, 0, depth_limit, units)?;
        Ok(root)
    }

    /// Рекурсивный спуск полного режима.
    ///
    /// Контекст ветки восстанавливается разбором идентификатора узла -
    /// полный режим буквально воспроизводит последовательность ленивых
    /// разворотов, чем и обеспечивается эквивалентность режимов.
    fn recurse(
        &self,
        node: &mut SpecTreeNode,
        depth: i64,
        max_depth: i64,
        units: &UnitMap,
    ) -> RepositoryResult<()> {
        if depth >= max_depth {
            return Ok(());
        }
        let parsed = match NodeId::parse(&node.id) {
            Some(parsed) => parsed,
            None => return Ok(()),
        };
        let mut children = self.expand(&parsed, true, units)?;
        for child in &mut children {
            let is_cycle = child.warnings.contains(&NodeWarning::CycleDetected);
            if child.node_type == NodeType::Item && !is_cycle {
                self.recurse(child, depth + 1, max_depth, units)?;
            }
        }
        node.children = Some(children);
        Ok(())
    }

    /// Общее ядро: дети одного изделия в заданном контексте предков.
    #[allow(clippy::too_many_arguments)]
    fn children_for(
        &self,
        parent_item_id: i64,
        parent_tree_qty: f64,
        parent_local_qty: f64,
        parent_path: &[i64],
        parent_node_id: &str,
        include_operations: bool,
        units: &UnitMap,
    ) -> RepositoryResult<Vec<SpecTreeNode>> {
        let mut nodes = Vec::new();

        let spec_id = match self.resolver.resolve_for_item_id(parent_item_id, None)? {
            Some(spec_id) => spec_id,
            None => return Ok(nodes), // лист - не ошибка
        };

        // Путь для детей включает текущее изделие
        let child_path: Vec<i64> = parent_path
            .iter()
            .copied()
            .chain(std::iter::once(parent_item_id))
            .collect();

        let components = self.specs.components_with_items(spec_id)?;
        tracing::debug!(
            spec_id = spec_id,
            parent_item_id = parent_item_id,
            components = components.len(),
            "развёртка строк состава"
        );

        for row in components {
            // Для узла с циклом зонд hasChildren не нужен:
            // построитель всё равно пометит его неразворачиваемым
            let has_rows = if child_path.contains(&row.item.item_id) {
                false
            } else {
                self.resolver.has_children(row.item.item_id)?
            };
            nodes.push(build_item_node(
                &row.item,
                Some(&row.component),
                row.stage.as_ref(),
                Some(parent_node_id),
                parent_tree_qty,
                &child_path,
                units.label(row.item.unit.as_deref()),
                has_rows,
            ));
        }

        if include_operations {
            if let Some(parent_item) = self.items.find_by_id(parent_item_id)? {
                let operations = self.specs.operations_with_names(spec_id)?;
                tracing::debug!(
                    spec_id = spec_id,
                    parent_item_id = parent_item_id,
                    operations = operations.len(),
                    "развёртка строк операций"
                );
                for row in operations {
                    nodes.push(build_operation_node(
                        &row.spec_operation,
                        &row.operation,
                        row.stage.as_ref(),
                        parent_node_id,
                        &parent_item,
                        parent_tree_qty,
                        parent_local_qty,
                        parent_path,
                    ));
                }
            }
        }

        Ok(nodes)
    }
}
