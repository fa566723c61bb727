// Public entities for the MAPA report API
// Domain entities are exposed directly; this module holds the API-only shapes

// Common entities for error handling
pub mod common;

// Identity number check
pub mod identity;

// List envelopes
pub mod lists;

pub use common::ErrorResponse;
pub use identity::{ValidateIdentityRequest, ValidateIdentityResponse};
pub use lists::{PatientListResponse, StudyHistoryResponse};
