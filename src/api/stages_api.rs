// ==========================================
// Система производственного планирования - API этапов производства
// ==========================================
// Назначение: сводный расчёт по этапам для изделий плана выпуска
// (POST /v1/stages/calculate)
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::engine::stage_rollup::{StageCalcResult, StageRollupEngine};

pub struct StagesApi {
    rollup: Arc<StageRollupEngine>,
    /// Путь к файлу метки последней синхронизации остатков
    /// (совместимость с прежним развёртыванием)
    last_sync_file: Option<PathBuf>,
}

impl StagesApi {
    pub fn new(rollup: Arc<StageRollupEngine>, last_sync_file: Option<PathBuf>) -> Self {
        Self {
            rollup,
            last_sync_file,
        }
    }

    /// Рассчитать этапы производства.
    ///
    /// Возвращает структуру этап -> изделия -> компоненты с количеством
    /// на 1 изделие, текущим остатком и меткой времени остатков (asOf).
    pub fn calculate(&self) -> ApiResult<StageCalcResult> {
        let result = self.rollup.calculate(self.last_sync_file.as_deref())?;
        tracing::info!(stages = result.stages.len(), "сводный расчёт по этапам завершён");
        Ok(result)
    }
}
