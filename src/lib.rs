// Page Builder - JSON collection store, template engine and page resolver

// Shared data model
pub mod models;

// Template engine - loops, conditionals, scalar placeholders
pub mod template;

// Infrastructure - file-backed store, template files, middleware
pub mod infrastructure;

// Services - page resolution
pub mod services;

// HTTP surface
pub mod routes;

// Application wiring
pub mod app_state;
pub mod config;

// Common utilities
pub mod error;
pub mod data_seeder;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use infrastructure::CollectionStore;
pub use services::PageService;
pub use template::{render, RenderContext, TemplateEngine};
