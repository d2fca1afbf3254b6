//! Bookstore catalog server
//!
//! A REST JSON API over a relational book catalog, with the storefront and
//! book detail pages the frontend hydrates.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire services over the given repository
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.media.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
