// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use mapa_report_data::repository::tests::{MockPatientRepository, MockProfileRepository, MockStudyRepository};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{
    AuthoringProfile, CreatePatientRequest, CreateStudyRequest, Patient, Statistics, StoredDiagnosticReport, Study,
    StudyDraft, StudyHistoryEntry, StudyInterpretation, UpdateProfileRequest,
};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::mapa::{MapaService, MapaServiceError, MapaServiceTrait};
use crate::services::narrative::{AnalysisOutcome, NarrativeError, NarrativeServiceTrait};

/// Narrative service returning a canned text, or failing when none is set
#[derive(Debug, Clone, Default)]
pub struct MockNarrativeService {
    text: Option<String>,
}

impl MockNarrativeService {
    /// A narrative service that is not configured
    pub fn unavailable() -> Self {
        Self { text: None }
    }

    pub fn with_text(text: &str) -> Self {
        Self { text: Some(text.to_string()) }
    }
}

#[async_trait]
impl NarrativeServiceTrait for MockNarrativeService {
    async fn generate_narrative(&self, _prompt: &str) -> Result<String, NarrativeError> {
        self.text.clone().ok_or(NarrativeError::NotConfigured)
    }
}

/// MAPA service over mock repositories.
///
/// Business rules run unchanged; only storage and the narrative client are replaced.
pub struct MockMapaService {
    inner: MapaService<MockPatientRepository, MockStudyRepository, MockProfileRepository>,
    should_fail_repository: bool,
}

impl Default for MockMapaService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMapaService {
    /// Create a new mock service with empty storage and no narrative
    pub fn new() -> Self {
        Self::with_narrative_service(MockNarrativeService::unavailable())
    }

    /// Configure the narrative text returned by analyses
    pub fn with_narrative(text: &str) -> Self {
        Self::with_narrative_service(MockNarrativeService::with_text(text))
    }

    fn with_narrative_service(narrative: MockNarrativeService) -> Self {
        Self {
            inner: MapaService::new(
                MockPatientRepository::new(),
                MockStudyRepository::new(),
                MockProfileRepository::new(),
                Arc::new(narrative),
            ),
            should_fail_repository: false,
        }
    }

    /// Configure the mock to fail every storage operation
    pub fn with_repository_failure(mut self) -> Self {
        self.should_fail_repository = true;
        self
    }

    fn check(&self) -> Result<(), MapaServiceError> {
        if self.should_fail_repository {
            Err(MapaServiceError::RepositoryError(
                "Repository error - mock is configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MapaServiceTrait for MockMapaService {
    fn validate_identity(&self, raw: &str) -> bool {
        self.inner.validate_identity(raw)
    }

    async fn register_patient(&self, request: CreatePatientRequest) -> Result<Patient, MapaServiceError> {
        self.check()?;
        self.inner.register_patient(request).await
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, MapaServiceError> {
        self.check()?;
        self.inner.list_patients().await
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, MapaServiceError> {
        self.check()?;
        self.inner.get_patient(id).await
    }

    async fn create_study(&self, request: CreateStudyRequest) -> Result<Study, MapaServiceError> {
        self.check()?;
        self.inner.create_study(request).await
    }

    async fn get_study(&self, id: &str) -> Result<Study, MapaServiceError> {
        self.check()?;
        self.inner.get_study(id).await
    }

    async fn list_studies(&self) -> Result<Vec<StudyHistoryEntry>, MapaServiceError> {
        self.check()?;
        self.inner.list_studies().await
    }

    async fn interpret_study(&self, id: &str) -> Result<StudyInterpretation, MapaServiceError> {
        self.check()?;
        self.inner.interpret_study(id).await
    }

    async fn generate_report(&self, study_id: &str) -> Result<StoredDiagnosticReport, MapaServiceError> {
        self.check()?;
        self.inner.generate_report(study_id).await
    }

    async fn generate_analysis(&self, study_id: &str) -> Result<AnalysisOutcome, MapaServiceError> {
        self.check()?;
        self.inner.generate_analysis(study_id).await
    }

    async fn save_draft(&self, draft: StudyDraft) -> Result<StudyDraft, MapaServiceError> {
        self.check()?;
        self.inner.save_draft(draft).await
    }

    async fn load_draft(&self) -> Result<Option<StudyDraft>, MapaServiceError> {
        self.check()?;
        self.inner.load_draft().await
    }

    async fn clear_draft(&self) -> Result<(), MapaServiceError> {
        self.check()?;
        self.inner.clear_draft().await
    }

    async fn statistics(&self) -> Result<Statistics, MapaServiceError> {
        self.check()?;
        self.inner.statistics().await
    }

    async fn get_profile(&self) -> Result<AuthoringProfile, MapaServiceError> {
        self.check()?;
        self.inner.get_profile().await
    }

    async fn save_profile(&self, request: UpdateProfileRequest) -> Result<AuthoringProfile, MapaServiceError> {
        self.check()?;
        self.inner.save_profile(request).await
    }

    async fn reset_profile(&self) -> Result<AuthoringProfile, MapaServiceError> {
        self.check()?;
        self.inner.reset_profile().await
    }
}

/// Mock implementation of the HealthServiceTrait for testing
#[derive(Debug, Clone)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    system_status: SystemStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
            components: HashMap::new(),
        }
    }

    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Set the overall system status
    pub fn with_system_status(mut self, status: SystemStatus) -> Self {
        self.system_status = status;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Database unavailable, using in-memory storage".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth {
            status: self.system_status.clone(),
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
