use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CreateStudyRequest, StoredReport, Study, StudyDraft};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;
use super::with_fallback;

/// Repository trait for studies, their generated reports and the working draft
#[async_trait]
pub trait StudyRepositoryTrait {
    /// Record a new study
    async fn create(&self, request: CreateStudyRequest) -> Result<Study, RepositoryError>;

    /// Get all studies, newest first
    async fn get_all(&self) -> Result<Vec<Study>, RepositoryError>;

    /// Get a study by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Study>, RepositoryError>;

    /// Number of recorded studies
    async fn count(&self) -> Result<usize, RepositoryError>;

    /// Persist a generated report, replacing the previous one for the same study
    async fn save_report(&self, report: StoredReport) -> Result<StoredReport, RepositoryError>;

    /// Latest report generated for a study
    async fn get_report_for_study(&self, study_id: Uuid) -> Result<Option<StoredReport>, RepositoryError>;

    async fn save_draft(&self, draft: StudyDraft) -> Result<StudyDraft, RepositoryError>;

    async fn get_draft(&self) -> Result<Option<StudyDraft>, RepositoryError>;

    async fn clear_draft(&self) -> Result<(), RepositoryError>;
}

/// Repository for studies.
/// Uses the SQLite pool when available and in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct StudyRepository {
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl StudyRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

fn study_from_request(request: CreateStudyRequest) -> Study {
    Study {
        id: Uuid::new_v4().to_string(),
        patient_id: request.patient_id,
        created_at: request.created_at,
        fields: request.fields,
    }
}

#[async_trait]
impl StudyRepositoryTrait for StudyRepository {
    async fn create(&self, request: CreateStudyRequest) -> Result<Study, RepositoryError> {
        let study = study_from_request(request);

        with_fallback(
            "store study",
            |pool| DatabaseStorage::store_study(pool, &study).map(|_| study.clone()),
            || self.storage.store_study(&study),
        )
    }

    async fn get_all(&self) -> Result<Vec<Study>, RepositoryError> {
        with_fallback("get studies", DatabaseStorage::get_studies, || self.storage.get_studies())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Study>, RepositoryError> {
        let id = id.to_string();
        with_fallback(
            "get study by id",
            |pool| DatabaseStorage::get_study(pool, &id),
            || self.storage.get_study(&id),
        )
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        with_fallback("count studies", DatabaseStorage::count_studies, || self.storage.count_studies())
    }

    async fn save_report(&self, report: StoredReport) -> Result<StoredReport, RepositoryError> {
        with_fallback(
            "store report",
            |pool| DatabaseStorage::store_report(pool, &report).map(|_| report.clone()),
            || self.storage.store_report(&report),
        )
    }

    async fn get_report_for_study(&self, study_id: Uuid) -> Result<Option<StoredReport>, RepositoryError> {
        let study_id = study_id.to_string();
        with_fallback(
            "get report",
            |pool| DatabaseStorage::get_report_for_study(pool, &study_id),
            || self.storage.get_report_for_study(&study_id),
        )
    }

    async fn save_draft(&self, draft: StudyDraft) -> Result<StudyDraft, RepositoryError> {
        with_fallback(
            "store draft",
            |pool| DatabaseStorage::store_draft(pool, &draft).map(|_| draft.clone()),
            || self.storage.store_draft(&draft),
        )
    }

    async fn get_draft(&self) -> Result<Option<StudyDraft>, RepositoryError> {
        with_fallback("get draft", DatabaseStorage::get_draft, || self.storage.get_draft())
    }

    async fn clear_draft(&self) -> Result<(), RepositoryError> {
        with_fallback("clear draft", DatabaseStorage::clear_draft, || self.storage.clear_draft())
    }
}

/// Mock study repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// Mock implementation of StudyRepository.
    ///
    /// Wraps a private in-memory store so each mock starts empty and isolated.
    #[derive(Default)]
    pub struct MockStudyRepository {
        storage: InMemoryStorage,
    }

    impl MockStudyRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined studies
        pub fn with_studies(studies: Vec<Study>) -> Self {
            let storage = InMemoryStorage::new();
            for study in &studies {
                // A fresh in-memory store cannot fail here.
                let _ = storage.store_study(study);
            }
            Self { storage }
        }
    }

    #[async_trait]
    impl StudyRepositoryTrait for MockStudyRepository {
        async fn create(&self, request: CreateStudyRequest) -> Result<Study, RepositoryError> {
            self.storage.store_study(&study_from_request(request))
        }

        async fn get_all(&self) -> Result<Vec<Study>, RepositoryError> {
            self.storage.get_studies()
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<Study>, RepositoryError> {
            self.storage.get_study(&id.to_string())
        }

        async fn count(&self) -> Result<usize, RepositoryError> {
            self.storage.count_studies()
        }

        async fn save_report(&self, report: StoredReport) -> Result<StoredReport, RepositoryError> {
            self.storage.store_report(&report)
        }

        async fn get_report_for_study(&self, study_id: Uuid) -> Result<Option<StoredReport>, RepositoryError> {
            self.storage.get_report_for_study(&study_id.to_string())
        }

        async fn save_draft(&self, draft: StudyDraft) -> Result<StudyDraft, RepositoryError> {
            self.storage.store_draft(&draft)
        }

        async fn get_draft(&self) -> Result<Option<StudyDraft>, RepositoryError> {
            self.storage.get_draft()
        }

        async fn clear_draft(&self) -> Result<(), RepositoryError> {
            self.storage.clear_draft()
        }
    }

    #[cfg(test)]
    mod behaviour {
        use super::*;
        use crate::models::StudyFields;

        fn request(created_at: &str) -> CreateStudyRequest {
            CreateStudyRequest {
                patient_id: Uuid::new_v4().to_string(),
                created_at: created_at.to_string(),
                fields: StudyFields {
                    study_date: "2024-05-10".to_string(),
                    duration: None,
                    quality: Some(88.0),
                    device: Some("Spacelabs 90207".to_string()),
                    avg_24h_systolic: 125.0,
                    avg_24h_diastolic: 75.0,
                    avg_day_systolic: 130.0,
                    avg_day_diastolic: 80.0,
                    avg_night_systolic: 110.0,
                    avg_night_diastolic: 65.0,
                    load_systolic: Some(15.0),
                    load_diastolic: Some(10.0),
                    dipping_systolic: Some(15.0),
                    dipping_diastolic: Some(18.0),
                    pulse_pressure: Some(50.0),
                    avg_heart_rate: None,
                    clinical_findings: None,
                    additional_notes: None,
                },
            }
        }

        #[tokio::test]
        async fn test_studies_newest_first() {
            let repo = StudyRepository::new();
            let older = repo.create(request("2024-05-10T08:00:00+00:00")).await.unwrap();
            let newer = repo.create(request("2024-05-12T08:00:00+00:00")).await.unwrap();

            let ids: Vec<String> = repo.get_all().await.unwrap().into_iter().map(|s| s.id).collect();
            assert_eq!(ids, vec![newer.id, older.id]);
            assert_eq!(repo.count().await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_report_replaced_for_same_study() {
            let repo = StudyRepository::new();
            let study_id = Uuid::new_v4();

            for version in 1..=2 {
                repo.save_report(StoredReport {
                    id: Uuid::new_v4().to_string(),
                    study_id: study_id.to_string(),
                    generated_at: format!("2024-05-1{}T08:00:00+00:00", version),
                    payload: serde_json::json!({ "version": version }),
                })
                .await
                .unwrap();
            }

            let report = repo.get_report_for_study(study_id).await.unwrap().unwrap();
            assert_eq!(report.payload["version"], 2);
            assert!(repo.get_report_for_study(Uuid::new_v4()).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_draft_lifecycle() {
            let repo = MockStudyRepository::new();
            assert!(repo.get_draft().await.unwrap().is_none());

            let draft = StudyDraft {
                avg_night_systolic: Some(118.0),
                clinical_findings: Some("Sin incidencias".to_string()),
                ..Default::default()
            };
            repo.save_draft(draft.clone()).await.unwrap();
            assert_eq!(repo.get_draft().await.unwrap(), Some(draft));

            repo.clear_draft().await.unwrap();
            assert!(repo.get_draft().await.unwrap().is_none());
        }
    }
}
