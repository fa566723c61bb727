use serde::{Deserialize, Serialize};

/// Storage model for a registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier for the patient
    pub id: String,

    /// Full name as entered at intake
    pub full_name: String,

    /// Age in years
    pub age: u32,

    /// National identity number as entered (punctuation preserved)
    pub identity_number: String,

    /// Identity number with separators removed and check character lower-cased.
    /// Used for duplicate detection.
    pub normalized_identity: String,

    /// Biological sex category as a string
    pub sex: String,

    /// Optional contact phone
    pub phone: Option<String>,

    /// Optional contact email
    pub email: Option<String>,

    /// Free-text disease history
    pub diseases: Option<String>,

    /// Free-text medication history
    pub medications: Option<String>,

    /// When the patient was registered (RFC 3339)
    pub registered_at: String,
}

/// Input data for registering a new patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub full_name: String,
    pub age: u32,
    pub identity_number: String,
    pub normalized_identity: String,
    pub sex: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub diseases: Option<String>,
    pub medications: Option<String>,
    pub registered_at: String,
}
