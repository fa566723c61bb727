use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub const DEFAULT_SPECIALTY: &str = "Cardiología";
pub const DEFAULT_INSTITUTION: &str = "Ergo SaniTas SpA";

/// The clinician who signs generated reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthoringProfile {
    pub name: String,
    pub specialty: String,
    pub institution: String,
    pub identity_number: String,
    /// Medical registry number
    pub registry: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for AuthoringProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            specialty: DEFAULT_SPECIALTY.to_string(),
            institution: DEFAULT_INSTITUTION.to_string(),
            identity_number: String::new(),
            registry: None,
            last_update: None,
        }
    }
}

/// Request payload for saving the profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Defaults to Cardiología when absent or blank
    pub specialty: Option<String>,

    /// Defaults to Ergo SaniTas SpA when absent or blank
    pub institution: Option<String>,

    #[validate(length(min = 1, message = "Identity number is required"))]
    pub identity_number: String,

    pub registry: Option<String>,
}
