use serde::{Deserialize, Serialize};

/// A generated diagnostic report, stored as an opaque JSON document.
///
/// The data layer does not interpret the report body; the domain layer owns its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Unique identifier for the report
    pub id: String,

    /// Study the report was generated from
    pub study_id: String,

    /// When the report was generated (RFC 3339)
    pub generated_at: String,

    /// Serialized report body
    pub payload: serde_json::Value,
}
