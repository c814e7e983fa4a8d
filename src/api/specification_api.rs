// ==========================================
// Система производственного планирования - API дерева спецификации
// ==========================================
// Назначение: проверка параметров двух читающих запросов (ленивый /tree
//             и полный /full) и оркестрация движка развёртки
// Порядок: некорректные параметры отклоняются до первого обращения
// к каталогу; словарь ЕИ строится один раз на запрос
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::tree::SpecTreeNode;
use crate::engine::assembler::{
    TreeAssembler, DEFAULT_MAX_DEPTH, MAX_MAX_DEPTH, MIN_MAX_DEPTH,
};
use crate::engine::node_builder::round_to;
use crate::engine::node_id::NodeId;
use crate::engine::units::UnitMap;
use crate::repository::{ItemRepository, ItemSelector, UnitRepository};

// ==========================================
// Параметры запросов
// ==========================================

/// Параметры ленивого запроса /v1/specification/tree
#[derive(Debug, Clone, Default)]
pub struct TreeQuery {
    pub item_code: Option<String>,
    pub item_id: Option<i64>,
    pub item_ref1c: Option<String>,
    pub root_qty: Option<f64>,
    /// Идентификатор узла для подгрузки детей; при наличии
    /// item_code/item_id/item_ref1c/root_qty игнорируются
    pub parent_id: Option<String>,
    pub include_operations: Option<bool>,
}

/// Параметры полного запроса /v1/specification/full
#[derive(Debug, Clone, Default)]
pub struct FullQuery {
    pub item_code: Option<String>,
    pub item_id: Option<i64>,
    pub item_ref1c: Option<String>,
    pub root_qty: Option<f64>,
    pub max_depth: Option<i64>,
}

// ==========================================
// Формат ответа
// ==========================================

/// Эхо принятых параметров в meta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<i64>,
}

/// Метаданные ответа
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeMeta {
    #[serde(rename = "rootId", skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<RequestedParams>,
}

/// Ответ обоих запросов дерева
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub nodes: Vec<SpecTreeNode>,
    pub meta: TreeMeta,
}

// ==========================================
// SpecificationApi
// ==========================================
pub struct SpecificationApi {
    items: Arc<ItemRepository>,
    units: Arc<UnitRepository>,
    assembler: Arc<TreeAssembler>,
}

impl SpecificationApi {
    pub fn new(
        items: Arc<ItemRepository>,
        units: Arc<UnitRepository>,
        assembler: Arc<TreeAssembler>,
    ) -> Self {
        Self {
            items,
            units,
            assembler,
        }
    }

    fn selector(
        item_code: &Option<String>,
        item_id: Option<i64>,
        item_ref1c: &Option<String>,
    ) -> ItemSelector {
        ItemSelector {
            item_id,
            item_code: item_code.clone().filter(|s| !s.trim().is_empty()),
            item_ref1c: item_ref1c.clone(),
        }
    }

    fn validate_root_qty(root_qty: Option<f64>) -> ApiResult<f64> {
        let root_qty = root_qty.unwrap_or(1.0);
        // Отрицательные, нулевые и NaN отклоняются одинаково
        if !(root_qty > 0.0) {
            return Err(ApiError::OutOfRange(format!(
                "root_qty должно быть > 0 (получено {root_qty})"
            )));
        }
        Ok(root_qty)
    }

    /// Ленивый запрос: корень либо дети узла parent_id.
    ///
    /// Режимы:
    /// - без parent_id: один узел типа item по селектору изделия;
    /// - с parent_id: список дочерних item и operation (одно поколение).
    pub fn tree(&self, query: &TreeQuery) -> ApiResult<TreeResponse> {
        let parent_id = query
            .parent_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(parent_raw) = parent_id {
            // Подгрузка детей: селектор изделия и root_qty игнорируются
            let parsed = NodeId::parse(parent_raw).ok_or_else(|| {
                ApiError::NotFound(format!("узел не найден: некорректный parent_id '{parent_raw}'"))
            })?;
            let include_operations = query.include_operations.unwrap_or(true);

            let units_map = UnitMap::load(&self.units);
            let nodes = self.assembler.expand(&parsed, include_operations, &units_map)?;
            tracing::debug!(
                parent_id = parent_raw,
                children = nodes.len(),
                "подгрузка детей узла"
            );
            return Ok(TreeResponse {
                nodes,
                meta: TreeMeta {
                    root_id: None,
                    parent_id: Some(parsed.encode()),
                    mode: Some("children".to_string()),
                    requested: None,
                },
            });
        }

        // Корневой режим: проверка параметров до обращения к каталогу
        let selector = Self::selector(&query.item_code, query.item_id, &query.item_ref1c);
        if selector.is_empty() {
            return Err(ApiError::InvalidInput(
                "требуется item_code, item_id или item_ref1c".to_string(),
            ));
        }
        let root_qty = Self::validate_root_qty(query.root_qty)?;

        let item = self
            .items
            .find_by_selector(&selector)?
            .ok_or_else(|| ApiError::NotFound("изделие не найдено".to_string()))?;

        let units_map = UnitMap::load(&self.units);
        let node = self.assembler.root_node(&item, root_qty, &units_map)?;
        tracing::debug!(
            item_id = item.item_id,
            root_id = node.id.as_str(),
            has_children = node.has_children,
            "корневой узел построен"
        );

        Ok(TreeResponse {
            meta: TreeMeta {
                root_id: Some(node.id.clone()),
                parent_id: None,
                mode: Some("root".to_string()),
                requested: Some(RequestedParams {
                    item_code: query.item_code.clone(),
                    item_id: Some(item.item_id),
                    root_qty: Some(round_to(root_qty, 3)),
                    max_depth: None,
                }),
            },
            nodes: vec![node],
        })
    }

    /// Полный запрос: всё дерево одним обращением.
    ///
    /// max_depth вне диапазона 1-50 отклоняется со статусом 422
    /// (для библиотечных вызовов движок дополнительно зажимает значение).
    pub fn full(&self, query: &FullQuery) -> ApiResult<TreeResponse> {
        let selector = Self::selector(&query.item_code, query.item_id, &query.item_ref1c);
        if selector.is_empty() {
            return Err(ApiError::InvalidInput(
                "требуется item_code, item_id или item_ref1c".to_string(),
            ));
        }
        let root_qty = Self::validate_root_qty(query.root_qty)?;
        let max_depth = query.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if !(MIN_MAX_DEPTH..=MAX_MAX_DEPTH).contains(&max_depth) {
            return Err(ApiError::OutOfRange(format!(
                "max_depth должно быть в диапазоне {MIN_MAX_DEPTH}-{MAX_MAX_DEPTH} (получено {max_depth})"
            )));
        }

        let item = self
            .items
            .find_by_selector(&selector)?
            .ok_or_else(|| ApiError::NotFound("изделие не найдено".to_string()))?;

        let units_map = UnitMap::load(&self.units);
        let root = self
            .assembler
            .full_tree(&item, root_qty, max_depth, &units_map)?;
        tracing::debug!(
            item_id = item.item_id,
            root_id = root.id.as_str(),
            max_depth = max_depth,
            "полное дерево построено"
        );

        Ok(TreeResponse {
            meta: TreeMeta {
                root_id: Some(root.id.clone()),
                parent_id: None,
                mode: Some("full".to_string()),
                requested: Some(RequestedParams {
                    item_code: query.item_code.clone(),
                    item_id: Some(item.item_id),
                    root_qty: Some(round_to(root_qty, 3)),
                    max_depth: Some(max_depth),
                }),
            },
            nodes: vec![root],
        })
    }
}
