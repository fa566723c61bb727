use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, instrument};

use mapa_report_domain::entities::StudyDraft;

use super::MapaApiService;
use crate::entities::ErrorResponse;

/// The in-progress study form
#[utoipa::path(
    get,
    path = "/api/v1/draft",
    responses(
        (status = 200, description = "Saved draft", body = StudyDraft),
        (status = 404, description = "No draft saved", body = ErrorResponse),
    ),
    tag = "draft"
)]
#[instrument(skip(service))]
pub async fn get_draft(State(service): State<MapaApiService>) -> Result<impl IntoResponse, ErrorResponse> {
    match service.load_draft().await? {
        Some(draft) => Ok((StatusCode::OK, Json(draft))),
        None => {
            debug!("No draft saved");
            Err(ErrorResponse::not_found("draft"))
        }
    }
}

/// Save the in-progress study form; incomplete measurements are allowed
#[utoipa::path(
    put,
    path = "/api/v1/draft",
    request_body = StudyDraft,
    responses(
        (status = 200, description = "Draft saved", body = StudyDraft),
    ),
    tag = "draft"
)]
#[instrument(skip(service, draft))]
pub async fn save_draft(
    State(service): State<MapaApiService>,
    Json(draft): Json<StudyDraft>,
) -> Result<impl IntoResponse, ErrorResponse> {
    Ok((StatusCode::OK, Json(service.save_draft(draft).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/draft",
    responses(
        (status = 204, description = "Draft discarded"),
    ),
    tag = "draft"
)]
#[instrument(skip(service))]
pub async fn clear_draft(State(service): State<MapaApiService>) -> Result<impl IntoResponse, ErrorResponse> {
    service.clear_draft().await?;
    Ok(StatusCode::NO_CONTENT)
}
