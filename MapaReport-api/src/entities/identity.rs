use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for checking an identity number
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ValidateIdentityRequest {
    /// Identity number as typed, e.g. "12.345.678-5"
    #[validate(length(max = 20, message = "Identity number cannot exceed 20 characters"))]
    pub identity_number: String,
}

/// Result of an identity number check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateIdentityResponse {
    pub identity_number: String,
    pub valid: bool,
}
