use std::sync::{Arc, Mutex};
use std::collections::HashMap;

use crate::models::{AuthoringProfile, Patient, StoredReport, Study, StudyDraft};
use super::errors::RepositoryError;

/// In-memory storage used when the database is not available
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    patients: Arc<Mutex<HashMap<String, Patient>>>,
    studies: Arc<Mutex<HashMap<String, Study>>>,
    /// Reports keyed by study id
    reports: Arc<Mutex<HashMap<String, StoredReport>>>,
    profile: Arc<Mutex<Option<AuthoringProfile>>>,
    draft: Arc<Mutex<Option<StudyDraft>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a patient, rejecting a second patient with the same normalized identity
    pub fn store_patient(&self, patient: &Patient) -> Result<Patient, RepositoryError> {
        let mut store = self.patients.lock()?;
        if store.values().any(|p| p.normalized_identity == patient.normalized_identity) {
            return Err(RepositoryError::Duplicate(format!(
                "patient with identity {} already exists",
                patient.identity_number
            )));
        }
        store.insert(patient.id.clone(), patient.clone());
        Ok(patient.clone())
    }

    /// All patients in registration order
    pub fn get_patients(&self) -> Result<Vec<Patient>, RepositoryError> {
        let store = self.patients.lock()?;
        let mut patients: Vec<Patient> = store.values().cloned().collect();
        patients.sort_by(|a, b| a.registered_at.cmp(&b.registered_at).then_with(|| a.id.cmp(&b.id)));
        Ok(patients)
    }

    pub fn get_patient(&self, id: &str) -> Result<Option<Patient>, RepositoryError> {
        let store = self.patients.lock()?;
        Ok(store.get(id).cloned())
    }

    pub fn find_patient_by_identity(&self, normalized_identity: &str) -> Result<Option<Patient>, RepositoryError> {
        let store = self.patients.lock()?;
        Ok(store.values().find(|p| p.normalized_identity == normalized_identity).cloned())
    }

    pub fn count_patients(&self) -> Result<usize, RepositoryError> {
        Ok(self.patients.lock()?.len())
    }

    /// Store or replace a study
    pub fn store_study(&self, study: &Study) -> Result<Study, RepositoryError> {
        let mut store = self.studies.lock()?;
        store.insert(study.id.clone(), study.clone());
        Ok(study.clone())
    }

    /// All studies, newest first
    pub fn get_studies(&self) -> Result<Vec<Study>, RepositoryError> {
        let store = self.studies.lock()?;
        let mut studies: Vec<Study> = store.values().cloned().collect();
        studies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(studies)
    }

    pub fn get_study(&self, id: &str) -> Result<Option<Study>, RepositoryError> {
        let store = self.studies.lock()?;
        Ok(store.get(id).cloned())
    }

    pub fn count_studies(&self) -> Result<usize, RepositoryError> {
        Ok(self.studies.lock()?.len())
    }

    /// Store a report, replacing any earlier report for the same study
    pub fn store_report(&self, report: &StoredReport) -> Result<StoredReport, RepositoryError> {
        let mut store = self.reports.lock()?;
        store.insert(report.study_id.clone(), report.clone());
        Ok(report.clone())
    }

    pub fn get_report_for_study(&self, study_id: &str) -> Result<Option<StoredReport>, RepositoryError> {
        let store = self.reports.lock()?;
        Ok(store.get(study_id).cloned())
    }

    pub fn get_profile(&self) -> Result<Option<AuthoringProfile>, RepositoryError> {
        Ok(self.profile.lock()?.clone())
    }

    pub fn store_profile(&self, profile: &AuthoringProfile) -> Result<AuthoringProfile, RepositoryError> {
        *self.profile.lock()? = Some(profile.clone());
        Ok(profile.clone())
    }

    pub fn clear_profile(&self) -> Result<(), RepositoryError> {
        *self.profile.lock()? = None;
        Ok(())
    }

    pub fn get_draft(&self) -> Result<Option<StudyDraft>, RepositoryError> {
        Ok(self.draft.lock()?.clone())
    }

    pub fn store_draft(&self, draft: &StudyDraft) -> Result<StudyDraft, RepositoryError> {
        *self.draft.lock()? = Some(draft.clone());
        Ok(draft.clone())
    }

    pub fn clear_draft(&self) -> Result<(), RepositoryError> {
        *self.draft.lock()? = None;
        Ok(())
    }
}
