use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CreatePatientRequest, Patient};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;
use super::with_fallback;

/// Repository trait for registered patients
#[async_trait]
pub trait PatientRepositoryTrait {
    /// Register a new patient. Fails with `Duplicate` when the normalized identity is taken.
    async fn create(&self, request: CreatePatientRequest) -> Result<Patient, RepositoryError>;

    /// Get all patients in registration order
    async fn get_all(&self) -> Result<Vec<Patient>, RepositoryError>;

    /// Get a patient by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Patient>, RepositoryError>;

    /// Find a patient by normalized identity number
    async fn find_by_identity(&self, normalized_identity: &str) -> Result<Option<Patient>, RepositoryError>;

    /// Number of registered patients
    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// Repository for patients.
/// Uses the SQLite pool when available and in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct PatientRepository {
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl PatientRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

fn patient_from_request(request: CreatePatientRequest) -> Patient {
    Patient {
        id: Uuid::new_v4().to_string(),
        full_name: request.full_name,
        age: request.age,
        identity_number: request.identity_number,
        normalized_identity: request.normalized_identity,
        sex: request.sex,
        phone: request.phone,
        email: request.email,
        diseases: request.diseases,
        medications: request.medications,
        registered_at: request.registered_at,
    }
}

#[async_trait]
impl PatientRepositoryTrait for PatientRepository {
    async fn create(&self, request: CreatePatientRequest) -> Result<Patient, RepositoryError> {
        let patient = patient_from_request(request);

        with_fallback(
            "store patient",
            |pool| DatabaseStorage::store_patient(pool, &patient).map(|_| patient.clone()),
            || self.storage.store_patient(&patient),
        )
    }

    async fn get_all(&self) -> Result<Vec<Patient>, RepositoryError> {
        with_fallback(
            "get patients",
            DatabaseStorage::get_patients,
            || self.storage.get_patients(),
        )
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Patient>, RepositoryError> {
        let id = id.to_string();
        with_fallback(
            "get patient by id",
            |pool| DatabaseStorage::get_patient(pool, &id),
            || self.storage.get_patient(&id),
        )
    }

    async fn find_by_identity(&self, normalized_identity: &str) -> Result<Option<Patient>, RepositoryError> {
        with_fallback(
            "find patient by identity",
            |pool| DatabaseStorage::find_patient_by_identity(pool, normalized_identity),
            || self.storage.find_patient_by_identity(normalized_identity),
        )
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        with_fallback(
            "count patients",
            DatabaseStorage::count_patients,
            || self.storage.count_patients(),
        )
    }
}

/// Mock patient repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of PatientRepository backed by a vector
    #[derive(Default)]
    pub struct MockPatientRepository {
        patients: Mutex<Vec<Patient>>,
    }

    impl MockPatientRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined patients
        pub fn with_patients(patients: Vec<Patient>) -> Self {
            Self { patients: Mutex::new(patients) }
        }
    }

    #[async_trait]
    impl PatientRepositoryTrait for MockPatientRepository {
        async fn create(&self, request: CreatePatientRequest) -> Result<Patient, RepositoryError> {
            let mut patients = self.patients.lock()?;
            if patients.iter().any(|p| p.normalized_identity == request.normalized_identity) {
                return Err(RepositoryError::Duplicate(request.identity_number));
            }
            let patient = patient_from_request(request);
            patients.push(patient.clone());
            Ok(patient)
        }

        async fn get_all(&self) -> Result<Vec<Patient>, RepositoryError> {
            Ok(self.patients.lock()?.clone())
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<Patient>, RepositoryError> {
            let id = id.to_string();
            Ok(self.patients.lock()?.iter().find(|p| p.id == id).cloned())
        }

        async fn find_by_identity(&self, normalized_identity: &str) -> Result<Option<Patient>, RepositoryError> {
            Ok(self
                .patients
                .lock()?
                .iter()
                .find(|p| p.normalized_identity == normalized_identity)
                .cloned())
        }

        async fn count(&self) -> Result<usize, RepositoryError> {
            Ok(self.patients.lock()?.len())
        }
    }

    #[cfg(test)]
    mod behaviour {
        use super::*;

        fn request(name: &str, normalized: &str, registered_at: &str) -> CreatePatientRequest {
            CreatePatientRequest {
                full_name: name.to_string(),
                age: 61,
                identity_number: normalized.to_string(),
                normalized_identity: normalized.to_string(),
                sex: "Male".to_string(),
                phone: Some("+56 9 1234 5678".to_string()),
                email: None,
                diseases: None,
                medications: Some("Losartán 50 mg".to_string()),
                registered_at: registered_at.to_string(),
            }
        }

        #[tokio::test]
        async fn test_repository_falls_back_to_memory() {
            let repo = PatientRepository::new();

            let created = repo
                .create(request("Juan Pérez", "123456785", "2024-01-01T09:00:00+00:00"))
                .await
                .unwrap();
            repo.create(request("Ana Soto", "111111111", "2024-01-02T09:00:00+00:00"))
                .await
                .unwrap();

            let id = Uuid::parse_str(&created.id).unwrap();
            assert_eq!(repo.get_by_id(id).await.unwrap(), Some(created.clone()));
            assert_eq!(repo.find_by_identity("123456785").await.unwrap(), Some(created));
            assert_eq!(repo.count().await.unwrap(), 2);

            let names: Vec<String> = repo.get_all().await.unwrap().into_iter().map(|p| p.full_name).collect();
            assert_eq!(names, vec!["Juan Pérez", "Ana Soto"]);
        }

        #[tokio::test]
        async fn test_repository_rejects_duplicate_identity() {
            let repo = PatientRepository::new();
            repo.create(request("Juan Pérez", "123456785", "2024-01-01T09:00:00+00:00"))
                .await
                .unwrap();

            let result = repo
                .create(request("Juan P.", "123456785", "2024-01-03T09:00:00+00:00"))
                .await;
            assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
            assert_eq!(repo.count().await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_unknown_id_is_none() {
            let repo = MockPatientRepository::new();
            assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
        }
    }
}
