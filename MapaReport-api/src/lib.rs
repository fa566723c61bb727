// MAPA Report API
//
// HTTP surface over the MAPA report domain service.

// Public modules
pub mod api;
pub mod entities;
pub mod openapi;

use axum::Router;

/// Create the application router
pub fn create_application() -> Router {
    api::create_application()
}
