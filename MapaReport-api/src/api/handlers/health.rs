use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use mapa_report_domain::health::{
    ComponentStatus as DomainComponentStatus, HealthService, HealthServiceTrait, SystemHealth, SystemStatus,
};

/// Health check response with system information
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: ComponentStatus,
    pub environment: String,
}

/// Status of individual system components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Database connection status
    pub database: ComponentHealthStatus,
    /// Narrative service status
    pub narrative: ComponentHealthStatus,
    /// Additional components (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<serde_json::Value>,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Track the time when the server started
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

fn now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time for uptime reporting
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(now_seconds());
    });
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy or running degraded", body = HealthResponse),
        (status = 503, description = "API is not healthy", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait + Send + Sync>>,
) -> impl IntoResponse {
    info!("Health check requested");

    let now = now_seconds();
    let uptime = SERVER_START_TIME.get().map(|&start_time| now.saturating_sub(start_time));

    let system_health = health_service.get_system_health().await;
    let response = build_health_response(&system_health, now, uptime);

    // Degraded still serves requests from in-memory storage
    let status = match system_health.status {
        SystemStatus::Healthy | SystemStatus::Degraded => StatusCode::OK,
        SystemStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response))
}

fn component(system_health: &SystemHealth, name: &str) -> ComponentHealthStatus {
    let found = system_health.components.get(name);
    ComponentHealthStatus {
        status: map_component_status(
            &found.map(|c| c.status.clone()).unwrap_or(DomainComponentStatus::Healthy),
        ),
        message: found.and_then(|c| c.details.clone()),
    }
}

fn build_health_response(system_health: &SystemHealth, now: u64, uptime: Option<u64>) -> HealthResponse {
    let overall_status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };

    let additional: serde_json::Map<String, serde_json::Value> = system_health
        .components
        .iter()
        .filter(|(name, _)| name.as_str() != "database" && name.as_str() != "narrative")
        .map(|(name, c)| {
            (
                name.clone(),
                serde_json::json!({
                    "status": map_component_status(&c.status),
                    "message": c.details,
                }),
            )
        })
        .collect();

    HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: ComponentStatus {
            database: component(system_health, "database"),
            narrative: component(system_health, "narrative"),
            additional: if additional.is_empty() { None } else { Some(additional.into()) },
        },
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

/// Factory function to create a health service
pub fn create_health_service() -> Arc<dyn HealthServiceTrait + Send + Sync> {
    Arc::new(HealthService::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapa_report_domain::testing::MockHealthService;

    #[tokio::test]
    async fn test_health_check_response() {
        initialize_server_start_time();

        let health_service = Arc::new(MockHealthService::new()) as Arc<dyn HealthServiceTrait + Send + Sync>;
        let response = health_check(Extension(health_service)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unhealthy_system_is_unavailable() {
        let health_service = Arc::new(
            MockHealthService::new()
                .with_unhealthy_database()
                .with_system_status(SystemStatus::Unhealthy),
        ) as Arc<dyn HealthServiceTrait + Send + Sync>;

        let response = health_check(Extension(health_service)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_extra_components_are_reported() {
        let health = MockHealthService::new()
            .with_degraded_database()
            .with_component("narrative", DomainComponentStatus::Degraded, Some("no key".to_string()))
            .with_component("cache", DomainComponentStatus::Healthy, None)
            .with_system_status(SystemStatus::Degraded)
            .get_system_health()
            .await;

        let response = build_health_response(&health, 100, Some(5));
        assert_eq!(response.status, "degraded");
        assert_eq!(response.components.database.status, "degraded");
        assert_eq!(response.components.narrative.message.as_deref(), Some("no key"));
        assert!(response.components.additional.unwrap().get("cache").is_some());
    }
}
