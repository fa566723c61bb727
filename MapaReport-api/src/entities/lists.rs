use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use mapa_report_domain::entities::{Patient, StudyHistoryEntry};

/// All registered patients
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientListResponse {
    pub total_count: usize,
    pub data: Vec<Patient>,
}

impl From<Vec<Patient>> for PatientListResponse {
    fn from(data: Vec<Patient>) -> Self {
        Self { total_count: data.len(), data }
    }
}

/// Study history, newest first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudyHistoryResponse {
    pub total_count: usize,
    pub data: Vec<StudyHistoryEntry>,
}

impl From<Vec<StudyHistoryEntry>> for StudyHistoryResponse {
    fn from(data: Vec<StudyHistoryEntry>) -> Self {
        Self { total_count: data.len(), data }
    }
}
