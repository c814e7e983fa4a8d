// ==========================================
// Система производственного планирования - слой конфигурации
// ==========================================
// Назначение: настройки процесса (путь к БД, адрес HTTP,
//             файл метки синхронизации остатков)
// Приоритет: переменные окружения -> каталоги пользователя по умолчанию
// ==========================================

pub mod settings;

pub use settings::AppConfig;
