use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, instrument};
use validator::Validate;

use super::MapaApiService;
use crate::entities::{ErrorResponse, ValidateIdentityRequest, ValidateIdentityResponse};

/// Check an identity number with the modulo-11 check character
#[utoipa::path(
    post,
    path = "/api/v1/identity/validate",
    request_body = ValidateIdentityRequest,
    responses(
        (status = 200, description = "Identity number checked", body = ValidateIdentityResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    tag = "identity"
)]
#[instrument(skip(service, request))]
pub async fn validate_identity(
    State(service): State<MapaApiService>,
    Json(request): Json<ValidateIdentityRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    request
        .validate()
        .map_err(|e| ErrorResponse::validation_error(&e.to_string(), None))?;

    let valid = service.validate_identity(&request.identity_number);
    debug!("Identity number checked, valid={}", valid);

    Ok((
        StatusCode::OK,
        Json(ValidateIdentityResponse {
            identity_number: request.identity_number,
            valid,
        }),
    ))
}
