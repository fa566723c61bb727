use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::instrument;

use mapa_report_domain::entities::Statistics;

use super::MapaApiService;
use crate::entities::ErrorResponse;

/// Patient and study counters
#[utoipa::path(
    get,
    path = "/api/v1/statistics",
    responses(
        (status = 200, description = "Counters", body = Statistics),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "statistics"
)]
#[instrument(skip(service))]
pub async fn get_statistics(State(service): State<MapaApiService>) -> Result<impl IntoResponse, ErrorResponse> {
    Ok((StatusCode::OK, Json(service.statistics().await?)))
}
