//! Domain layer health check functionality

use std::collections::HashMap;

use async_trait::async_trait;
use mapa_report_data::database;

use crate::services::narrative::NarrativeConfig;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    /// Component works with reduced capability
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    /// Returns true if the database is healthy, false if not
    /// Returns an error if the check could not be performed
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service backed by the shared database pool and narrative configuration
#[derive(Debug, Default, Clone)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        get_system_health().await
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        check_database_status().await
    }
}

/// Check if the database is available and functioning properly
///
/// Returns:
/// - Ok(true) if the database is fully operational
/// - Ok(false) if the database has degraded functionality
/// - Err if the database is completely unavailable
pub async fn check_database_status() -> Result<bool, String> {
    match database::get_connection_info() {
        Some(info) => Ok(info.contains("healthy")),
        None => match database::get_db_pool() {
            Ok(_) => Ok(true),
            Err(e) => Err(format!("Database connection error: {}", e)),
        },
    }
}

fn database_component(status: Result<bool, String>) -> HealthComponent {
    match status {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Database is available but has performance issues".to_string()),
        },
        // Repositories keep working against in-memory storage
        Err(e) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some(format!("{}; using in-memory storage", e)),
        },
    }
}

fn narrative_component(config: &NarrativeConfig) -> HealthComponent {
    if config.api_key.is_some() {
        HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(format!("model {}", config.model)),
        }
    } else {
        HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("No API key configured; analyses use the deterministic interpretation".to_string()),
        }
    }
}

fn overall_status(components: &HashMap<String, HealthComponent>) -> SystemStatus {
    if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
        SystemStatus::Unhealthy
    } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
        SystemStatus::Degraded
    } else {
        SystemStatus::Healthy
    }
}

/// Get overall system health
pub async fn get_system_health() -> SystemHealth {
    let db_component = database_component(check_database_status().await);
    let narrative = narrative_component(&NarrativeConfig::from_env());

    let components: HashMap<String, HealthComponent> = vec![
        ("database".to_string(), db_component),
        ("narrative".to_string(), narrative),
    ]
    .into_iter()
    .collect();

    SystemHealth {
        status: overall_status(&components),
        components,
    }
}
