use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Biological sex category recorded at intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        };
        f.write_str(s)
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Sex::Male),
            "Female" => Ok(Sex::Female),
            "Other" => Ok(Sex::Other),
            other => Err(format!("Unknown sex category: {}", other)),
        }
    }
}

/// A registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub age: u32,
    /// National identity number as entered
    pub identity_number: String,
    pub sex: Sex,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Free-text disease history
    pub diseases: Option<String>,
    /// Free-text medication history
    pub medications: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Request payload for patient intake
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: u32,

    #[validate(length(min = 1, message = "Identity number is required"))]
    pub identity_number: String,

    pub sex: Sex,

    pub phone: Option<String>,

    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,

    #[validate(length(max = 2000, message = "Disease history cannot exceed 2000 characters"))]
    pub diseases: Option<String>,

    #[validate(length(max = 2000, message = "Medication history cannot exceed 2000 characters"))]
    pub medications: Option<String>,
}
