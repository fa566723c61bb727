use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::classification::StudyAnalysis;
use super::interpretation::Statement;
use super::patient::Patient;
use super::profile::AuthoringProfile;
use super::study::StudyMeasurement;

pub const REPORT_TITLE: &str = "Ambulatory Blood Pressure Monitoring Report";
pub const REPORT_SUBTITLE: &str = "24-hour Blood Pressure Holter (ABPM)";

/// Signature block of a report.
///
/// Blank profile fields are `None`; the rendering layer chooses placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ReportSignature {
    pub name: Option<String>,
    pub specialty: String,
    pub institution: String,
    pub identity_number: Option<String>,
    pub registry: Option<String>,
}

impl From<&AuthoringProfile> for ReportSignature {
    fn from(profile: &AuthoringProfile) -> Self {
        let present = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Self {
            name: present(&profile.name),
            specialty: present(&profile.specialty)
                .unwrap_or_else(|| super::profile::DEFAULT_SPECIALTY.to_string()),
            institution: present(&profile.institution)
                .unwrap_or_else(|| super::profile::DEFAULT_INSTITUTION.to_string()),
            identity_number: present(&profile.identity_number),
            registry: profile.registry.as_deref().and_then(present),
        }
    }
}

/// Immutable report document handed to rendering and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DiagnosticReport {
    pub title: String,
    pub subtitle: String,
    pub institution: String,
    pub patient: Patient,
    pub study: StudyMeasurement,
    pub analysis: StudyAnalysis,
    /// Interpretation statements in emission order
    pub statements: Vec<Statement>,
    pub signature: ReportSignature,
    pub generated_at: DateTime<Utc>,
}

/// A report persisted for a recorded study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StoredDiagnosticReport {
    pub id: Uuid,
    pub study_id: Uuid,
    pub report: DiagnosticReport,
}
