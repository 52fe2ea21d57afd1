// ExamForge - content-generation job service for the quiz platform

pub mod config;
pub mod exams;
pub mod generation;
pub mod jobs;
pub mod models;
pub mod retention;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
