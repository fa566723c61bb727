use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use mapa_report_data::models as data;
use mapa_report_data::repository::{
    PatientRepository, PatientRepositoryTrait, ProfileRepository, ProfileRepositoryTrait, RepositoryError,
    StudyRepository, StudyRepositoryTrait,
};

use crate::entities::conversions;
use crate::entities::profile::{DEFAULT_INSTITUTION, DEFAULT_SPECIALTY};
use crate::entities::{
    AuthoringProfile, CreatePatientRequest, CreateStudyRequest, Patient, Statistics, StoredDiagnosticReport, Study,
    StudyDraft, StudyHistoryEntry, StudyInterpretation, UpdateProfileRequest,
};
use super::analysis::analyze;
use super::assembler::assemble;
use super::identity::validate_identity;
use super::interpreter::{interpret, interpret_analysis};
use super::narrative::{
    build_narrative_prompt, resolve_analysis, AnalysisOutcome, NarrativeServiceTrait, OpenRouterNarrativeClient,
};

pub const PATIENT_NOT_FOUND_LABEL: &str = "patient not found";

/// Application service errors
#[derive(Debug, Error)]
pub enum MapaServiceError {
    /// Rejected input, safe to show to the user
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Stored data no longer satisfies the completeness invariant
    #[error("Precondition failed: {0}")]
    Precondition(String),
}

/// Patient intake, study workflow and report generation
#[async_trait]
pub trait MapaServiceTrait {
    /// Checksum validation of a national identity number
    fn validate_identity(&self, raw: &str) -> bool;

    /// Register a patient. All-or-nothing: invalid or duplicate identity numbers are rejected.
    async fn register_patient(&self, request: CreatePatientRequest) -> Result<Patient, MapaServiceError>;

    async fn list_patients(&self) -> Result<Vec<Patient>, MapaServiceError>;

    async fn get_patient(&self, id: &str) -> Result<Patient, MapaServiceError>;

    /// Record a complete study for an existing patient
    async fn create_study(&self, request: CreateStudyRequest) -> Result<Study, MapaServiceError>;

    async fn get_study(&self, id: &str) -> Result<Study, MapaServiceError>;

    /// Study history, newest first
    async fn list_studies(&self) -> Result<Vec<StudyHistoryEntry>, MapaServiceError>;

    /// Deterministic interpretation of a recorded study
    async fn interpret_study(&self, id: &str) -> Result<StudyInterpretation, MapaServiceError>;

    /// Build, persist and return the report for a study
    async fn generate_report(&self, study_id: &str) -> Result<StoredDiagnosticReport, MapaServiceError>;

    /// Narrative analysis, falling back to the deterministic interpretation
    async fn generate_analysis(&self, study_id: &str) -> Result<AnalysisOutcome, MapaServiceError>;

    async fn save_draft(&self, draft: StudyDraft) -> Result<StudyDraft, MapaServiceError>;

    async fn load_draft(&self) -> Result<Option<StudyDraft>, MapaServiceError>;

    async fn clear_draft(&self) -> Result<(), MapaServiceError>;

    async fn statistics(&self) -> Result<Statistics, MapaServiceError>;

    /// The saved profile, or the defaults when none was saved
    async fn get_profile(&self) -> Result<AuthoringProfile, MapaServiceError>;

    async fn save_profile(&self, request: UpdateProfileRequest) -> Result<AuthoringProfile, MapaServiceError>;

    /// Remove the saved profile and return the defaults
    async fn reset_profile(&self) -> Result<AuthoringProfile, MapaServiceError>;
}

/// MAPA application service over the repository collaborators
pub struct MapaService<P, S, F> {
    patients: P,
    studies: S,
    profiles: F,
    narrative: Arc<dyn NarrativeServiceTrait + Send + Sync>,
}

impl<P, S, F> MapaService<P, S, F>
where
    P: PatientRepositoryTrait + Send + Sync,
    S: StudyRepositoryTrait + Send + Sync,
    F: ProfileRepositoryTrait + Send + Sync,
{
    /// Create a new MAPA service
    pub fn new(patients: P, studies: S, profiles: F, narrative: Arc<dyn NarrativeServiceTrait + Send + Sync>) -> Self {
        Self { patients, studies, profiles, narrative }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> MapaServiceError {
        match err {
            RepositoryError::NotFound(msg) => MapaServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => MapaServiceError::ValidationError(msg),
            RepositoryError::Duplicate(msg) => MapaServiceError::ValidationError(format!("duplicate identity number: {}", msg)),
            _ => MapaServiceError::RepositoryError(err.to_string()),
        }
    }

    fn parse_id(id: &str) -> Result<Uuid, MapaServiceError> {
        conversions::parse_string_to_uuid(id).map_err(MapaServiceError::ValidationError)
    }

    async fn load_patient(&self, id: Uuid) -> Result<Option<Patient>, MapaServiceError> {
        self.patients
            .get_by_id(id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .map(|p| conversions::convert_to_domain_patient(p).map_err(MapaServiceError::RepositoryError))
            .transpose()
    }

    async fn load_study(&self, id: &str) -> Result<Study, MapaServiceError> {
        let id = Self::parse_id(id)?;
        let stored = self
            .studies
            .get_by_id(id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| MapaServiceError::NotFound(format!("Study with ID {} not found", id)))?;

        conversions::convert_to_domain_study(stored).map_err(MapaServiceError::Precondition)
    }

    async fn load_study_with_patient(&self, id: &str) -> Result<(Study, Patient), MapaServiceError> {
        let study = self.load_study(id).await?;
        let patient = self.load_patient(study.patient_id).await?.ok_or_else(|| {
            MapaServiceError::NotFound(format!("Patient with ID {} not found", study.patient_id))
        })?;
        Ok((study, patient))
    }
}

/// Flatten validator errors into one message
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, error_msgs.join(", "))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn non_blank(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[async_trait]
impl<P, S, F> MapaServiceTrait for MapaService<P, S, F>
where
    P: PatientRepositoryTrait + Send + Sync,
    S: StudyRepositoryTrait + Send + Sync,
    F: ProfileRepositoryTrait + Send + Sync,
{
    fn validate_identity(&self, raw: &str) -> bool {
        validate_identity(raw)
    }

    #[instrument(skip(self, request), fields(identity = %request.identity_number))]
    async fn register_patient(&self, request: CreatePatientRequest) -> Result<Patient, MapaServiceError> {
        request
            .validate()
            .map_err(|e| MapaServiceError::ValidationError(format_validation_errors(&e)))?;

        if request.full_name.trim().is_empty() {
            return Err(MapaServiceError::ValidationError("full_name: Full name is required".to_string()));
        }

        if !validate_identity(&request.identity_number) {
            return Err(MapaServiceError::ValidationError(format!(
                "invalid identity number: {}",
                request.identity_number
            )));
        }

        let normalized = conversions::normalize_identity(&request.identity_number);
        let existing = self
            .patients
            .find_by_identity(&normalized)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        if existing.is_some() {
            warn!("Rejected duplicate patient intake");
            return Err(MapaServiceError::ValidationError(format!(
                "duplicate identity number: {}",
                request.identity_number
            )));
        }

        let data_request = conversions::convert_to_data_create_patient(&request, Utc::now());
        let stored = self
            .patients
            .create(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Registered patient {}", stored.id);
        conversions::convert_to_domain_patient(stored).map_err(MapaServiceError::RepositoryError)
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, MapaServiceError> {
        let stored = self.patients.get_all().await.map_err(|e| self.map_repo_error(e))?;

        stored
            .into_iter()
            .map(|p| conversions::convert_to_domain_patient(p).map_err(MapaServiceError::RepositoryError))
            .collect()
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, MapaServiceError> {
        let uuid = Self::parse_id(id)?;
        self.load_patient(uuid)
            .await?
            .ok_or_else(|| MapaServiceError::NotFound(format!("Patient with ID {} not found", id)))
    }

    #[instrument(skip(self, request), fields(patient_id = %request.patient_id))]
    async fn create_study(&self, request: CreateStudyRequest) -> Result<Study, MapaServiceError> {
        let patient_id = Self::parse_id(&request.patient_id)?;
        if self.load_patient(patient_id).await?.is_none() {
            return Err(MapaServiceError::NotFound(format!("Patient with ID {} not found", patient_id)));
        }

        let measurement = request
            .measurement
            .build()
            .map_err(|e| MapaServiceError::ValidationError(e.to_string()))?;

        let stored = self
            .studies
            .create(data::CreateStudyRequest {
                patient_id: patient_id.to_string(),
                created_at: Utc::now().to_rfc3339(),
                fields: conversions::convert_to_data_study_fields(&measurement),
            })
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Recorded study {} for patient {}", stored.id, patient_id);
        conversions::convert_to_domain_study(stored).map_err(MapaServiceError::Precondition)
    }

    async fn get_study(&self, id: &str) -> Result<Study, MapaServiceError> {
        self.load_study(id).await
    }

    async fn list_studies(&self) -> Result<Vec<StudyHistoryEntry>, MapaServiceError> {
        let stored = self.studies.get_all().await.map_err(|e| self.map_repo_error(e))?;

        let mut entries = Vec::with_capacity(stored.len());
        for study in stored {
            let study = conversions::convert_to_domain_study(study).map_err(MapaServiceError::Precondition)?;
            let patient_name = match self.load_patient(study.patient_id).await? {
                Some(patient) => patient.full_name,
                None => {
                    debug!("Study {} references missing patient {}", study.id, study.patient_id);
                    PATIENT_NOT_FOUND_LABEL.to_string()
                }
            };

            entries.push(StudyHistoryEntry {
                study_id: study.id,
                patient_id: study.patient_id,
                patient_name,
                study_date: study.measurement.study_date,
                created_at: study.created_at,
                avg_24h_systolic: study.measurement.avg_24h_systolic,
                avg_24h_diastolic: study.measurement.avg_24h_diastolic,
                dipping_systolic: study.measurement.dipping_systolic,
                quality: study.measurement.quality,
            });
        }

        Ok(entries)
    }

    async fn interpret_study(&self, id: &str) -> Result<StudyInterpretation, MapaServiceError> {
        let study = self.load_study(id).await?;
        let analysis = analyze(&study.measurement);
        let statements = interpret_analysis(&analysis);

        Ok(StudyInterpretation {
            study_id: study.id,
            analysis,
            statements,
        })
    }

    #[instrument(skip(self))]
    async fn generate_report(&self, study_id: &str) -> Result<StoredDiagnosticReport, MapaServiceError> {
        let (study, patient) = self.load_study_with_patient(study_id).await?;
        let profile = self.get_profile().await?;

        let statements = interpret(&study.measurement);
        let report = assemble(&patient, &study.measurement, &statements, &profile);

        let stored = StoredDiagnosticReport {
            id: Uuid::new_v4(),
            study_id: study.id,
            report,
        };

        let payload = serde_json::to_value(&stored.report)
            .map_err(|e| MapaServiceError::RepositoryError(e.to_string()))?;
        self.studies
            .save_report(data::StoredReport {
                id: stored.id.to_string(),
                study_id: stored.study_id.to_string(),
                generated_at: stored.report.generated_at.to_rfc3339(),
                payload,
            })
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Generated report {} for study {}", stored.id, stored.study_id);
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn generate_analysis(&self, study_id: &str) -> Result<AnalysisOutcome, MapaServiceError> {
        let (study, patient) = self.load_study_with_patient(study_id).await?;

        let prompt = build_narrative_prompt(&patient, &study.measurement);
        let narrative = self.narrative.generate_narrative(&prompt).await;

        Ok(resolve_analysis(narrative, &study.measurement))
    }

    async fn save_draft(&self, mut draft: StudyDraft) -> Result<StudyDraft, MapaServiceError> {
        draft.saved_at = Some(Utc::now());
        let stored = self
            .studies
            .save_draft(conversions::convert_to_data_draft(&draft))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        conversions::convert_to_domain_draft(stored).map_err(MapaServiceError::RepositoryError)
    }

    async fn load_draft(&self) -> Result<Option<StudyDraft>, MapaServiceError> {
        self.studies
            .get_draft()
            .await
            .map_err(|e| self.map_repo_error(e))?
            .map(|d| conversions::convert_to_domain_draft(d).map_err(MapaServiceError::RepositoryError))
            .transpose()
    }

    async fn clear_draft(&self) -> Result<(), MapaServiceError> {
        self.studies.clear_draft().await.map_err(|e| self.map_repo_error(e))
    }

    async fn statistics(&self) -> Result<Statistics, MapaServiceError> {
        let patients = self.patients.count().await.map_err(|e| self.map_repo_error(e))?;
        let studies = self.studies.count().await.map_err(|e| self.map_repo_error(e))?;
        Ok(Statistics { patients, studies })
    }

    async fn get_profile(&self) -> Result<AuthoringProfile, MapaServiceError> {
        match self.profiles.get().await.map_err(|e| self.map_repo_error(e))? {
            Some(profile) => conversions::convert_to_domain_profile(profile).map_err(MapaServiceError::RepositoryError),
            None => Ok(AuthoringProfile::default()),
        }
    }

    async fn save_profile(&self, request: UpdateProfileRequest) -> Result<AuthoringProfile, MapaServiceError> {
        request
            .validate()
            .map_err(|e| MapaServiceError::ValidationError(format_validation_errors(&e)))?;

        let name = request.name.trim().to_string();
        let identity_number = request.identity_number.trim().to_string();
        if name.is_empty() || identity_number.is_empty() {
            return Err(MapaServiceError::ValidationError(
                "Name and identity number are required".to_string(),
            ));
        }

        let profile = AuthoringProfile {
            name,
            specialty: non_blank(request.specialty, DEFAULT_SPECIALTY),
            institution: non_blank(request.institution, DEFAULT_INSTITUTION),
            identity_number,
            registry: request.registry.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            last_update: Some(Utc::now()),
        };

        let stored = self
            .profiles
            .save(conversions::convert_to_data_profile(&profile))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Saved authoring profile");
        conversions::convert_to_domain_profile(stored).map_err(MapaServiceError::RepositoryError)
    }

    async fn reset_profile(&self) -> Result<AuthoringProfile, MapaServiceError> {
        self.profiles.reset().await.map_err(|e| self.map_repo_error(e))?;
        info!("Authoring profile reset to defaults");
        Ok(AuthoringProfile::default())
    }
}

/// Create a default MAPA service using the repositories from the data layer
pub fn create_default_mapa_service() -> impl MapaServiceTrait + Send + Sync {
    MapaService::new(
        PatientRepository::new(),
        StudyRepository::new(),
        ProfileRepository::new(),
        Arc::new(OpenRouterNarrativeClient::from_env()),
    )
}

/// Create a mock MAPA service for testing
/// This function is only available when the mock feature is enabled
#[cfg(feature = "mock")]
pub fn create_mock_mapa_service() -> impl MapaServiceTrait + Send + Sync {
    crate::testing::MockMapaService::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockall::mock;
    use mapa_report_data::repository::tests::{MockPatientRepository, MockProfileRepository, MockStudyRepository};

    use crate::entities::{MeasurementPeriod, Sex, StatementCategory, StudyMeasurementBuilder};
    use crate::services::narrative::NarrativeError;

    mock! {
        pub FailingPatients {}

        #[async_trait]
        impl PatientRepositoryTrait for FailingPatients {
            async fn create(&self, request: data::CreatePatientRequest) -> Result<data::Patient, RepositoryError>;
            async fn get_all(&self) -> Result<Vec<data::Patient>, RepositoryError>;
            async fn get_by_id(&self, id: Uuid) -> Result<Option<data::Patient>, RepositoryError>;
            async fn find_by_identity(&self, normalized_identity: &str) -> Result<Option<data::Patient>, RepositoryError>;
            async fn count(&self) -> Result<usize, RepositoryError>;
        }
    }

    struct StubNarrative(Option<String>);

    #[async_trait]
    impl NarrativeServiceTrait for StubNarrative {
        async fn generate_narrative(&self, _prompt: &str) -> Result<String, NarrativeError> {
            self.0.clone().ok_or(NarrativeError::NotConfigured)
        }
    }

    type TestService = MapaService<MockPatientRepository, MockStudyRepository, MockProfileRepository>;

    fn service_with(narrative: Option<&str>) -> TestService {
        MapaService::new(
            MockPatientRepository::new(),
            MockStudyRepository::new(),
            MockProfileRepository::new(),
            Arc::new(StubNarrative(narrative.map(str::to_string))),
        )
    }

    fn intake(identity: &str) -> CreatePatientRequest {
        CreatePatientRequest {
            full_name: "María González".to_string(),
            age: 58,
            identity_number: identity.to_string(),
            sex: Sex::Female,
            phone: None,
            email: Some("maria@example.com".to_string()),
            diseases: Some("Diabetes tipo 2".to_string()),
            medications: None,
        }
    }

    fn hypertensive_measurement() -> StudyMeasurementBuilder {
        StudyMeasurementBuilder::new()
            .study_date(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap())
            .averages(MeasurementPeriod::TwentyFourHour, 138.0, 86.0)
            .averages(MeasurementPeriod::Day, 142.0, 89.0)
            .averages(MeasurementPeriod::Night, 128.0, 76.0)
            .dipping(5.0, 4.0)
            .loads(45.0, 38.0)
            .pulse_pressure(58.0)
    }

    async fn registered_study(service: &TestService) -> (Patient, Study) {
        let patient = service.register_patient(intake("12.345.678-5")).await.unwrap();
        let study = service
            .create_study(CreateStudyRequest {
                patient_id: patient.id.to_string(),
                measurement: hypertensive_measurement(),
            })
            .await
            .unwrap();
        (patient, study)
    }

    #[tokio::test]
    async fn test_register_patient_normalizes_and_rejects_duplicates() {
        let service = service_with(None);

        let patient = service.register_patient(intake("12.345.678-5")).await.unwrap();
        assert_eq!(patient.full_name, "María González");
        assert_eq!(patient.identity_number, "12.345.678-5");

        let result = service.register_patient(intake("12345678-5")).await;
        match result {
            Err(MapaServiceError::ValidationError(msg)) => assert!(msg.contains("duplicate identity number")),
            other => panic!("expected duplicate rejection, got {:?}", other),
        }

        assert_eq!(service.statistics().await.unwrap().patients, 1);
    }

    #[tokio::test]
    async fn test_register_patient_rejects_invalid_identity() {
        let service = service_with(None);

        let result = service.register_patient(intake("12.345.678-4")).await;
        assert!(matches!(result, Err(MapaServiceError::ValidationError(msg)) if msg.contains("invalid identity number")));
        assert_eq!(service.statistics().await.unwrap().patients, 0);
    }

    #[tokio::test]
    async fn test_register_patient_rejects_blank_name_and_bad_age() {
        let service = service_with(None);

        let mut blank = intake("11.111.111-1");
        blank.full_name = "   ".to_string();
        assert!(matches!(service.register_patient(blank).await, Err(MapaServiceError::ValidationError(_))));

        let mut old = intake("11.111.111-1");
        old.age = 151;
        match service.register_patient(old).await {
            Err(MapaServiceError::ValidationError(msg)) => assert!(msg.contains("age")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_study_requires_existing_patient() {
        let service = service_with(None);

        let result = service
            .create_study(CreateStudyRequest {
                patient_id: Uuid::new_v4().to_string(),
                measurement: hypertensive_measurement(),
            })
            .await;
        assert!(matches!(result, Err(MapaServiceError::NotFound(_))));

        let result = service
            .create_study(CreateStudyRequest {
                patient_id: "not-a-uuid".to_string(),
                measurement: hypertensive_measurement(),
            })
            .await;
        assert!(matches!(result, Err(MapaServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_study_lists_missing_fields() {
        let service = service_with(None);
        let patient = service.register_patient(intake("12.345.678-5")).await.unwrap();

        let mut measurement = hypertensive_measurement();
        measurement.avg_night_systolic = None;
        measurement.avg_night_diastolic = None;

        match service
            .create_study(CreateStudyRequest {
                patient_id: patient.id.to_string(),
                measurement,
            })
            .await
        {
            Err(MapaServiceError::ValidationError(msg)) => {
                assert!(msg.contains("avg_night_systolic"));
                assert!(msg.contains("avg_night_diastolic"));
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
        assert_eq!(service.statistics().await.unwrap().studies, 0);
    }

    #[tokio::test]
    async fn test_interpret_study() {
        let service = service_with(None);
        let (_, study) = registered_study(&service).await;

        let interpretation = service.interpret_study(&study.id.to_string()).await.unwrap();
        assert!(interpretation.analysis.hypertension_confirmed);
        assert_eq!(interpretation.statements[0].category, StatementCategory::Diagnosis);
        assert!(interpretation
            .statements
            .iter()
            .any(|s| s.category == StatementCategory::HypertensiveLoad));
    }

    #[tokio::test]
    async fn test_list_studies_marks_missing_patient() {
        let orphan = data::Study {
            id: Uuid::new_v4().to_string(),
            patient_id: Uuid::new_v4().to_string(),
            created_at: "2024-01-01T10:00:00+00:00".to_string(),
            fields: conversions::convert_to_data_study_fields(&hypertensive_measurement().build().unwrap()),
        };
        let service = MapaService::new(
            MockPatientRepository::new(),
            MockStudyRepository::with_studies(vec![orphan]),
            MockProfileRepository::new(),
            Arc::new(StubNarrative(None)),
        );

        let history = service.list_studies().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].patient_name, PATIENT_NOT_FOUND_LABEL);
        assert_eq!(history[0].avg_24h_systolic, 138.0);
    }

    #[tokio::test]
    async fn test_generate_report_uses_profile_defaults() {
        let service = service_with(None);
        let (patient, study) = registered_study(&service).await;

        let stored = service.generate_report(&study.id.to_string()).await.unwrap();
        assert_eq!(stored.study_id, study.id);
        assert_eq!(stored.report.patient.id, patient.id);
        assert_eq!(stored.report.signature.specialty, DEFAULT_SPECIALTY);
        assert_eq!(stored.report.signature.name, None);
        assert!(!stored.report.statements.is_empty());

        let missing = service.generate_report(&Uuid::new_v4().to_string()).await;
        assert!(matches!(missing, Err(MapaServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_generate_analysis_prefers_narrative() {
        let service = service_with(Some("Análisis narrativo"));
        let (_, study) = registered_study(&service).await;

        let outcome = service.generate_analysis(&study.id.to_string()).await.unwrap();
        assert_eq!(outcome, AnalysisOutcome::Narrative { text: "Análisis narrativo".to_string() });
    }

    #[tokio::test]
    async fn test_generate_analysis_falls_back_to_interpretation() {
        let service = service_with(None);
        let (_, study) = registered_study(&service).await;

        match service.generate_analysis(&study.id.to_string()).await.unwrap() {
            AnalysisOutcome::Deterministic { analysis, statements, .. } => {
                assert!(analysis.hypertension_confirmed);
                assert_eq!(statements, interpret(&study.measurement));
            }
            other => panic!("expected deterministic fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_profile_lifecycle() {
        let service = service_with(None);

        let profile = service.get_profile().await.unwrap();
        assert_eq!(profile, AuthoringProfile::default());

        let saved = service
            .save_profile(UpdateProfileRequest {
                name: "  Dr. Juan Pérez ".to_string(),
                specialty: Some("   ".to_string()),
                institution: None,
                identity_number: "11.111.111-1".to_string(),
                registry: Some("".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(saved.name, "Dr. Juan Pérez");
        assert_eq!(saved.specialty, DEFAULT_SPECIALTY);
        assert_eq!(saved.institution, DEFAULT_INSTITUTION);
        assert_eq!(saved.registry, None);
        assert!(saved.last_update.is_some());

        assert_eq!(service.get_profile().await.unwrap().name, "Dr. Juan Pérez");

        let reset = service.reset_profile().await.unwrap();
        assert_eq!(reset, AuthoringProfile::default());
        assert_eq!(service.get_profile().await.unwrap(), AuthoringProfile::default());
    }

    #[tokio::test]
    async fn test_save_profile_requires_name() {
        let service = service_with(None);

        let result = service
            .save_profile(UpdateProfileRequest {
                name: " ".to_string(),
                specialty: None,
                institution: None,
                identity_number: "11.111.111-1".to_string(),
                registry: None,
            })
            .await;
        assert!(matches!(result, Err(MapaServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_draft_lifecycle() {
        let service = service_with(None);
        assert!(service.load_draft().await.unwrap().is_none());

        let draft = StudyDraft {
            patient_id: None,
            measurement: StudyMeasurementBuilder::new().averages(MeasurementPeriod::Day, 141.0, 88.0),
            saved_at: None,
        };
        let saved = service.save_draft(draft).await.unwrap();
        assert!(saved.saved_at.is_some());

        let loaded = service.load_draft().await.unwrap().unwrap();
        assert_eq!(loaded.measurement.avg_day_systolic, Some(141.0));

        service.clear_draft().await.unwrap();
        assert!(service.load_draft().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repository_failure_is_mapped() {
        let mut patients = MockFailingPatients::new();
        patients
            .expect_count()
            .returning(|| Err(RepositoryError::Lock("poisoned".to_string())));
        patients
            .expect_get_by_id()
            .returning(|_| Err(RepositoryError::NotFound("gone".to_string())));

        let service = MapaService::new(
            patients,
            MockStudyRepository::new(),
            MockProfileRepository::new(),
            Arc::new(StubNarrative(None)),
        );

        assert!(matches!(service.statistics().await, Err(MapaServiceError::RepositoryError(_))));
        assert!(matches!(
            service.get_patient(&Uuid::new_v4().to_string()).await,
            Err(MapaServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_validate_identity_delegates() {
        let service = service_with(None);
        assert!(service.validate_identity("7.654.321-6"));
        assert!(!service.validate_identity("7.654.321-5"));
    }
}
