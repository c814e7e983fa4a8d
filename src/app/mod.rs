// ==========================================
// Система производственного планирования - прикладной слой
// ==========================================
// Назначение: сборка состояния приложения и HTTP-интерфейс
// ==========================================

pub mod http;
pub mod state;

// Реэкспорт
pub use state::AppState;
