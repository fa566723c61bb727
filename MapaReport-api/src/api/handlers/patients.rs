use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use mapa_report_domain::entities::{CreatePatientRequest, Patient};

use super::MapaApiService;
use crate::entities::{ErrorResponse, PatientListResponse};

/// List registered patients
#[utoipa::path(
    get,
    path = "/api/v1/patients",
    responses(
        (status = 200, description = "Registered patients", body = PatientListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn list_patients(State(service): State<MapaApiService>) -> Result<impl IntoResponse, ErrorResponse> {
    let patients = service.list_patients().await?;
    Ok((StatusCode::OK, Json(PatientListResponse::from(patients))))
}

/// Register a new patient
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = Patient),
        (status = 400, description = "Invalid, or duplicate identity number", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, request))]
pub async fn create_patient(
    State(service): State<MapaApiService>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    match service.register_patient(request).await {
        Ok(patient) => {
            info!("Patient registered with ID: {}", patient.id);
            Ok((StatusCode::CREATED, Json(patient)))
        }
        Err(e) => {
            warn!("Patient intake rejected: {}", e);
            Err(e.into())
        }
    }
}

/// Get a single patient by ID
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    params(
        ("id" = Uuid, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient found", body = Patient),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn get_patient(
    State(service): State<MapaApiService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let patient = service.get_patient(&id.to_string()).await?;
    Ok((StatusCode::OK, Json(patient)))
}
