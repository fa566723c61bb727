use serde::{Deserialize, Serialize};

/// Storage model for the clinician who signs the reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoringProfile {
    pub name: String,
    pub specialty: String,
    pub institution: String,
    pub identity_number: String,
    pub registry: Option<String>,
    /// Last time the profile was saved (RFC 3339)
    pub last_update: Option<String>,
}
