// ==========================================
// Система производственного планирования - разрешение спецификации
// ==========================================
// Назначение: определить, какая спецификация управляет составом изделия
// Контракт: (изделие, необязательная характеристика) -> spec_id или None.
// None - это НЕ ошибка: изделие без спецификации (закупаемая деталь) -
// нормальный лист дерева
// ==========================================

use std::sync::Arc;

use crate::domain::catalog::Item;
use crate::repository::{ItemRepository, RepositoryResult, SpecificationRepository};

/// Разрешение управляющей спецификации.
///
/// Алгоритм:
/// 1) привязка default_specifications для (изделие, характеристика);
/// 2) резерв: спецификация, чей код или наименование совпадает с кодом
///    или наименованием изделия, - только при ровно одном совпадении;
/// 3) иначе изделие - лист.
///
/// Для одинаковых входов в пределах запроса результат детерминирован.
pub struct SpecResolver {
    items: Arc<ItemRepository>,
    specs: Arc<SpecificationRepository>,
}

impl SpecResolver {
    pub fn new(items: Arc<ItemRepository>, specs: Arc<SpecificationRepository>) -> Self {
        Self { items, specs }
    }

    /// Разрешение по уже загруженному изделию
    pub fn resolve_for_item(
        &self,
        item: &Item,
        characteristic_id: Option<&str>,
    ) -> RepositoryResult<Option<i64>> {
        if let Some(spec_id) = self
            .specs
            .default_spec_for(item.item_id, characteristic_id)?
        {
            tracing::debug!(
                item_id = item.item_id,
                spec_id = spec_id,
                "спецификация по умолчанию найдена"
            );
            return Ok(Some(spec_id));
        }

        let fallback = self
            .specs
            .find_unique_by_code_or_name(&item.item_code, &item.item_name)?;
        if let Some(spec_id) = fallback {
            tracing::debug!(
                item_id = item.item_id,
                spec_id = spec_id,
                "спецификация подобрана по коду/наименованию"
            );
            return Ok(Some(spec_id));
        }

        tracing::debug!(item_id = item.item_id, "спецификация не найдена, изделие - лист");
        Ok(None)
    }

    /// Разрешение по ID изделия (изделие догружается из каталога)
    pub fn resolve_for_item_id(
        &self,
        item_id: i64,
        characteristic_id: Option<&str>,
    ) -> RepositoryResult<Option<i64>> {
        let item = match self.items.find_by_id(item_id)? {
            Some(item) => item,
            None => return Ok(None),
        };
        self.resolve_for_item(&item, characteristic_id)
    }

    /// Есть ли у изделия дети (хотя бы одна строка состава или операций
    /// в управляющей спецификации)
    pub fn has_children(&self, item_id: i64) -> RepositoryResult<bool> {
        match self.resolve_for_item_id(item_id, None)? {
            Some(spec_id) => self.specs.has_rows(spec_id),
            None => Ok(false),
        }
    }
}
