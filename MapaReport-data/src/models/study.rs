use serde::{Deserialize, Serialize};

/// Measurement fields shared by stored studies and create requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyFields {
    /// Date the recording started (YYYY-MM-DD)
    pub study_date: String,
    pub duration: Option<String>,
    pub quality: Option<f64>,
    pub device: Option<String>,

    pub avg_24h_systolic: f64,
    pub avg_24h_diastolic: f64,
    pub avg_day_systolic: f64,
    pub avg_day_diastolic: f64,
    pub avg_night_systolic: f64,
    pub avg_night_diastolic: f64,

    pub load_systolic: Option<f64>,
    pub load_diastolic: Option<f64>,
    pub dipping_systolic: Option<f64>,
    pub dipping_diastolic: Option<f64>,
    pub pulse_pressure: Option<f64>,
    pub avg_heart_rate: Option<f64>,

    pub clinical_findings: Option<String>,
    pub additional_notes: Option<String>,
}

/// Storage model for a study session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    /// Unique identifier for the study
    pub id: String,

    /// Patient the study belongs to
    pub patient_id: String,

    /// When the study was recorded in the system (RFC 3339)
    pub created_at: String,

    #[serde(flatten)]
    pub fields: StudyFields,
}

/// Input data for recording a new study
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudyRequest {
    pub patient_id: String,
    pub created_at: String,
    pub fields: StudyFields,
}

/// An in-progress measurement set. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyDraft {
    pub patient_id: Option<String>,
    pub study_date: Option<String>,
    pub duration: Option<String>,
    pub quality: Option<f64>,
    pub device: Option<String>,
    pub avg_24h_systolic: Option<f64>,
    pub avg_24h_diastolic: Option<f64>,
    pub avg_day_systolic: Option<f64>,
    pub avg_day_diastolic: Option<f64>,
    pub avg_night_systolic: Option<f64>,
    pub avg_night_diastolic: Option<f64>,
    pub load_systolic: Option<f64>,
    pub load_diastolic: Option<f64>,
    pub dipping_systolic: Option<f64>,
    pub dipping_diastolic: Option<f64>,
    pub pulse_pressure: Option<f64>,
    pub avg_heart_rate: Option<f64>,
    pub clinical_findings: Option<String>,
    pub additional_notes: Option<String>,
    /// Last time the draft was saved (RFC 3339)
    pub saved_at: Option<String>,
}
