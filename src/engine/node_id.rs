// ==========================================
// Система производственного планирования - идентичность узлов дерева
// ==========================================
// Назначение: детерминированный строковый идентификатор узла,
//             пригодный для разбора на стороне сервера
// Протокол без состояния: сервер не хранит выданные узлы, поэтому
// идентификатор кодирует всё, что нужно для ленивой подгрузки детей:
//   - ссылку на сущность;
//   - накопленное количество (канонизированное до 6 знаков);
//   - ЛОКАЛЬНЫЙ множитель родителя (нормы времени операций
//     определены именно на него);
//   - путь предков (для проверки циклов относительно пути).
// Форматы:
//   item:{item_id}:{tree_qty:.6}:{qty_per_parent:.6}:{p1-p2-...}
//   op:{spec_operation_id}:{parent_item_id}:{parent_tree_qty:.6}:{p1-p2-...}
// Одна и та же номенклатура, достигнутая разными путями или цепочками
// множителей, обязана давать разные идентификаторы
// ==========================================

/// Разобранная идентичность узла дерева
#[derive(Debug, Clone, PartialEq)]
pub enum NodeId {
    Item {
        item_id: i64,
        /// Накопленное от корня количество (каноническое, 6 знаков)
        tree_qty: f64,
        /// Количество на единицу непосредственного родителя (1 для корня)
        qty_per_parent: f64,
        /// Путь предков от корня (без самого узла)
        path: Vec<i64>,
    },
    Operation {
        spec_operation_id: i64,
        parent_item_id: i64,
        parent_tree_qty: f64,
        /// Путь предков родительского изделия (без него самого)
        path: Vec<i64>,
    },
}

/// Канонизация количества до 6 знаков через строковое представление.
///
/// И ленивый, и полный режимы получают накопленные количества из одного
/// и того же строкового формата, поэтому их вычисления совпадают бит-в-бит
/// (контракт эквивалентности режимов).
pub fn canon_qty(value: f64) -> f64 {
    format!("{value:.6}").parse::<f64>().unwrap_or(value)
}

fn encode_path(path: &[i64]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

fn parse_path(raw: &str) -> Option<Vec<i64>> {
    if raw.is_empty() {
        return Some(Vec::new());
    }
    raw.split('-').map(|p| p.parse::<i64>().ok()).collect()
}

impl NodeId {
    /// Строковое представление для поля id узла
    pub fn encode(&self) -> String {
        match self {
            NodeId::Item {
                item_id,
                tree_qty,
                qty_per_parent,
                path,
            } => format!(
                "item:{item_id}:{tree_qty:.6}:{qty_per_parent:.6}:{}",
                encode_path(path)
            ),
            NodeId::Operation {
                spec_operation_id,
                parent_item_id,
                parent_tree_qty,
                path,
            } => format!(
                "op:{spec_operation_id}:{parent_item_id}:{parent_tree_qty:.6}:{}",
                encode_path(path)
            ),
        }
    }

    /// Разбор идентификатора, пришедшего от клиента.
    ///
    /// Некорректный формат - это None (слой API трактует его как 404),
    /// не panic и не ошибка БД.
    pub fn parse(raw: &str) -> Option<NodeId> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 5 {
            return None;
        }
        match parts[0] {
            "item" => Some(NodeId::Item {
                item_id: parts[1].parse().ok()?,
                tree_qty: parts[2].parse().ok()?,
                qty_per_parent: parts[3].parse().ok()?,
                path: parse_path(parts[4])?,
            }),
            "op" => Some(NodeId::Operation {
                spec_operation_id: parts[1].parse().ok()?,
                parent_item_id: parts[2].parse().ok()?,
                parent_tree_qty: parts[3].parse().ok()?,
                path: parse_path(parts[4])?,
            }),
            _ => None,
        }
    }
}
