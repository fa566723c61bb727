pub mod draft;
pub mod health;
pub mod identity;
pub mod patients;
pub mod profile;
pub mod statistics;
pub mod studies;

use std::sync::Arc;

use mapa_report_domain::services::{create_default_mapa_service, MapaServiceTrait};

/// Service type for dependency injection
pub type MapaApiService = Arc<dyn MapaServiceTrait + Send + Sync>;

/// Create the default service for the handlers to use
pub fn create_service() -> MapaApiService {
    Arc::new(create_default_mapa_service())
}

// Re-export handlers for easier imports
pub use health::health_check;
