// ==========================================
// Система производственного планирования - состояние приложения
// ==========================================
// Назначение: сборка разделяемого состояния и экземпляров API
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{SpecificationApi, StagesApi};
use crate::config::AppConfig;
use crate::db;
use crate::engine::{SpecResolver, StageRollupEngine, TreeAssembler};
use crate::repository::{
    ItemRepository, PlanRepository, SpecificationRepository, StageRepository, UnitRepository,
};

/// Состояние приложения
///
/// Содержит экземпляры читающих API и путь к БД каталога.
/// Разделяемое изменяемое состояние - только соединение с каталогом
/// за Arc<Mutex<...>>; сами запросы развёртки состояния не имеют
pub struct AppState {
    /// Путь к БД каталога
    pub db_path: String,

    /// API дерева спецификации (ленивый и полный режимы)
    pub specification_api: Arc<SpecificationApi>,

    /// API сводного расчёта по этапам
    pub stages_api: Arc<StagesApi>,
}

impl AppState {
    /// Создание AppState
    ///
    /// # Параметры
    /// - config: настройки процесса (путь к БД, файл метки синхронизации)
    ///
    /// # Возврат
    /// - Ok(AppState): собранное состояние
    /// - Err(String): ошибка инициализации
    ///
    /// # Порядок
    /// 1. Открыть соединение с каталогом (единые PRAGMA).
    /// 2. Инициализировать репозитории.
    /// 3. Собрать движки и API.
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        tracing::info!("инициализация AppState, БД каталога: {}", config.db_path);

        let conn = db::open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("не удалось открыть базу данных: {e}"))?;

        // Предупреждение о версии схемы (автомиграций нет: схемой
        // владеет контур синхронизации каталога)
        match db::read_schema_version(&conn) {
            Ok(Some(version)) if version < db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "схема БД устарела: version={}, ожидается {}",
                    version,
                    db::CURRENT_SCHEMA_VERSION
                );
            }
            Ok(Some(version)) => {
                tracing::info!("версия схемы БД: {}", version);
            }
            Ok(None) => {
                tracing::warn!("таблица schema_version отсутствует (пустая или сторонняя БД)");
            }
            Err(e) => {
                tracing::warn!("не удалось прочитать версию схемы (продолжаем): {}", e);
            }
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Слой репозиториев
        // ==========================================
        let item_repo = Arc::new(ItemRepository::new(conn.clone()));
        let spec_repo = Arc::new(SpecificationRepository::new(conn.clone()));
        let unit_repo = Arc::new(UnitRepository::new(conn.clone()));
        let stage_repo = Arc::new(StageRepository::new(conn.clone()));
        let plan_repo = Arc::new(PlanRepository::new(conn.clone()));

        // ==========================================
        // Слой движков
        // ==========================================
        let resolver = Arc::new(SpecResolver::new(item_repo.clone(), spec_repo.clone()));
        let assembler = Arc::new(TreeAssembler::new(
            item_repo.clone(),
            spec_repo.clone(),
            resolver.clone(),
        ));
        let rollup = Arc::new(StageRollupEngine::new(
            item_repo.clone(),
            spec_repo.clone(),
            stage_repo,
            plan_repo,
            resolver,
        ));

        // ==========================================
        // Слой API
        // ==========================================
        let specification_api = Arc::new(SpecificationApi::new(item_repo, unit_repo, assembler));
        let stages_api = Arc::new(StagesApi::new(rollup, config.last_sync_file.clone()));

        tracing::info!("инициализация AppState завершена");

        Ok(Self {
            db_path: config.db_path.clone(),
            specification_api,
            stages_api,
        })
    }
}
