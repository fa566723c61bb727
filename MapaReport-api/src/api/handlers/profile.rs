use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::instrument;

use mapa_report_domain::entities::{AuthoringProfile, UpdateProfileRequest};

use super::MapaApiService;
use crate::entities::ErrorResponse;

/// The signing clinician's profile, defaults when none is saved
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Current profile", body = AuthoringProfile),
    ),
    tag = "profile"
)]
#[instrument(skip(service))]
pub async fn get_profile(State(service): State<MapaApiService>) -> Result<impl IntoResponse, ErrorResponse> {
    Ok((StatusCode::OK, Json(service.get_profile().await?)))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = AuthoringProfile),
        (status = 400, description = "Name or identity number missing", body = ErrorResponse),
    ),
    tag = "profile"
)]
#[instrument(skip(service, request))]
pub async fn update_profile(
    State(service): State<MapaApiService>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    Ok((StatusCode::OK, Json(service.save_profile(request).await?)))
}

/// Restore the default profile
#[utoipa::path(
    delete,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile reset", body = AuthoringProfile),
    ),
    tag = "profile"
)]
#[instrument(skip(service))]
pub async fn reset_profile(State(service): State<MapaApiService>) -> Result<impl IntoResponse, ErrorResponse> {
    Ok((StatusCode::OK, Json(service.reset_profile().await?)))
}
