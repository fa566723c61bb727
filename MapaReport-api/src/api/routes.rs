use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use mapa_report_domain::health::HealthServiceTrait;

use crate::api::handlers::{
    self, draft, health, identity, patients, profile, statistics, studies, MapaApiService,
};
use crate::openapi::configure_swagger_routes;

/// Create the application router with the default services
pub fn create_app() -> Router {
    create_app_with(handlers::create_service(), health::create_health_service())
}

/// Create the application router over the given services
pub fn create_app_with(
    service: MapaApiService,
    health_service: Arc<dyn HealthServiceTrait + Send + Sync>,
) -> Router {
    debug!("Creating application router");

    // Literal segments before parametrized ones
    let api_routes = Router::new()
        .route("/identity/validate", post(identity::validate_identity))
        .route("/patients", get(patients::list_patients).post(patients::create_patient))
        .route("/patients/:id", get(patients::get_patient))
        .route("/studies", get(studies::list_studies).post(studies::create_study))
        .route("/studies/:id", get(studies::get_study))
        .route("/studies/:id/interpretation", get(studies::get_interpretation))
        .route("/studies/:id/analysis", post(studies::generate_analysis))
        .route("/studies/:id/report", get(studies::get_report))
        .route(
            "/profile",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(profile::reset_profile),
        )
        .route(
            "/draft",
            get(draft::get_draft).put(draft::save_draft).delete(draft::clear_draft),
        )
        .route("/statistics", get(statistics::get_statistics));

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .with_state(service)
        .merge(configure_swagger_routes());

    debug!("Swagger UI merged");

    health::initialize_server_start_time();

    configure_layers(app)
}

/// CORS, security headers and request tracing for the whole application
pub fn configure_layers(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(cors)
        .layer(security_headers)
        .layer(TraceLayer::new_for_http())
}
