use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use mapa_report_domain::entities::{CreateStudyRequest, StoredDiagnosticReport, Study, StudyInterpretation};
use mapa_report_domain::services::AnalysisOutcome;

use super::MapaApiService;
use crate::entities::{ErrorResponse, StudyHistoryResponse};

/// Study history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/studies",
    responses(
        (status = 200, description = "Study history", body = StudyHistoryResponse),
        (status = 422, description = "A stored study is incomplete", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "studies"
)]
#[instrument(skip(service))]
pub async fn list_studies(State(service): State<MapaApiService>) -> Result<impl IntoResponse, ErrorResponse> {
    let history = service.list_studies().await?;
    Ok((StatusCode::OK, Json(StudyHistoryResponse::from(history))))
}

/// Record a study for an existing patient
#[utoipa::path(
    post,
    path = "/api/v1/studies",
    request_body = CreateStudyRequest,
    responses(
        (status = 201, description = "Study recorded", body = Study),
        (status = 400, description = "Incomplete or invalid measurements", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    tag = "studies"
)]
#[instrument(skip(service, request))]
pub async fn create_study(
    State(service): State<MapaApiService>,
    Json(request): Json<CreateStudyRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    match service.create_study(request).await {
        Ok(study) => {
            info!("Study recorded with ID: {}", study.id);
            Ok((StatusCode::CREATED, Json(study)))
        }
        Err(e) => {
            warn!("Study rejected: {}", e);
            Err(e.into())
        }
    }
}

/// Get a recorded study
#[utoipa::path(
    get,
    path = "/api/v1/studies/{id}",
    params(
        ("id" = Uuid, Path, description = "Study ID")
    ),
    responses(
        (status = 200, description = "Study found", body = Study),
        (status = 404, description = "Study not found", body = ErrorResponse),
    ),
    tag = "studies"
)]
#[instrument(skip(service))]
pub async fn get_study(
    State(service): State<MapaApiService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let study = service.get_study(&id.to_string()).await?;
    Ok((StatusCode::OK, Json(study)))
}

/// Classification summary and clinical statements for a study
#[utoipa::path(
    get,
    path = "/api/v1/studies/{id}/interpretation",
    params(
        ("id" = Uuid, Path, description = "Study ID")
    ),
    responses(
        (status = 200, description = "Study interpreted", body = StudyInterpretation),
        (status = 404, description = "Study not found", body = ErrorResponse),
    ),
    tag = "studies"
)]
#[instrument(skip(service))]
pub async fn get_interpretation(
    State(service): State<MapaApiService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let interpretation = service.interpret_study(&id.to_string()).await?;
    Ok((StatusCode::OK, Json(interpretation)))
}

/// Narrative analysis of a study, or the deterministic interpretation when unavailable
#[utoipa::path(
    post,
    path = "/api/v1/studies/{id}/analysis",
    params(
        ("id" = Uuid, Path, description = "Study ID")
    ),
    responses(
        (status = 200, description = "Analysis produced", body = AnalysisOutcome),
        (status = 404, description = "Study or patient not found", body = ErrorResponse),
    ),
    tag = "studies"
)]
#[instrument(skip(service))]
pub async fn generate_analysis(
    State(service): State<MapaApiService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let outcome = service.generate_analysis(&id.to_string()).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

/// Generate and store the diagnostic report for a study
#[utoipa::path(
    get,
    path = "/api/v1/studies/{id}/report",
    params(
        ("id" = Uuid, Path, description = "Study ID")
    ),
    responses(
        (status = 200, description = "Report generated", body = StoredDiagnosticReport),
        (status = 404, description = "Study or patient not found", body = ErrorResponse),
    ),
    tag = "studies"
)]
#[instrument(skip(service))]
pub async fn get_report(
    State(service): State<MapaApiService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let report = service.generate_report(&id.to_string()).await?;
    Ok((StatusCode::OK, Json(report)))
}
