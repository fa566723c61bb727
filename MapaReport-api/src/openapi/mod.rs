use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,

        crate::api::handlers::identity::validate_identity,

        crate::api::handlers::patients::list_patients,
        crate::api::handlers::patients::create_patient,
        crate::api::handlers::patients::get_patient,

        crate::api::handlers::studies::list_studies,
        crate::api::handlers::studies::create_study,
        crate::api::handlers::studies::get_study,
        crate::api::handlers::studies::get_interpretation,
        crate::api::handlers::studies::generate_analysis,
        crate::api::handlers::studies::get_report,

        crate::api::handlers::profile::get_profile,
        crate::api::handlers::profile::update_profile,
        crate::api::handlers::profile::reset_profile,

        crate::api::handlers::draft::get_draft,
        crate::api::handlers::draft::save_draft,
        crate::api::handlers::draft::clear_draft,

        crate::api::handlers::statistics::get_statistics
    ),
    components(
        schemas(
            // API entities
            crate::entities::ErrorResponse,
            crate::entities::ValidateIdentityRequest,
            crate::entities::ValidateIdentityResponse,
            crate::entities::PatientListResponse,
            crate::entities::StudyHistoryResponse,

            // Health
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,

            // Domain entities
            mapa_report_domain::entities::Patient,
            mapa_report_domain::entities::CreatePatientRequest,
            mapa_report_domain::entities::Sex,
            mapa_report_domain::entities::Study,
            mapa_report_domain::entities::StudyMeasurement,
            mapa_report_domain::entities::StudyMeasurementBuilder,
            mapa_report_domain::entities::CreateStudyRequest,
            mapa_report_domain::entities::StudyDraft,
            mapa_report_domain::entities::StudyHistoryEntry,
            mapa_report_domain::entities::Statistics,
            mapa_report_domain::entities::MeasurementPeriod,
            mapa_report_domain::entities::BloodPressureLabel,
            mapa_report_domain::entities::BloodPressureClassification,
            mapa_report_domain::entities::DippingPattern,
            mapa_report_domain::entities::RiskLabel,
            mapa_report_domain::entities::StudyAnalysis,
            mapa_report_domain::entities::StatementCategory,
            mapa_report_domain::entities::Finding,
            mapa_report_domain::entities::Statement,
            mapa_report_domain::entities::StudyInterpretation,
            mapa_report_domain::entities::AuthoringProfile,
            mapa_report_domain::entities::UpdateProfileRequest,
            mapa_report_domain::entities::ReportSignature,
            mapa_report_domain::entities::DiagnosticReport,
            mapa_report_domain::entities::StoredDiagnosticReport,
            mapa_report_domain::services::AnalysisOutcome
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "identity", description = "Identity number validation"),
        (name = "patients", description = "Patient intake"),
        (name = "studies", description = "ABPM studies, interpretation and reports"),
        (name = "profile", description = "Signing clinician profile"),
        (name = "draft", description = "In-progress study form"),
        (name = "statistics", description = "Dashboard counters")
    ),
    info(
        title = "MAPA Report API",
        version = "0.1.0",
        description = "Ambulatory blood pressure monitoring classification and report generation",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "MAPA Report API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags are defined");
        assert!(tags.iter().any(|tag| tag.name == "studies"));
        assert!(tags.iter().any(|tag| tag.name == "patients"));

        for path in [
            "/health",
            "/api/v1/identity/validate",
            "/api/v1/patients",
            "/api/v1/patients/{id}",
            "/api/v1/studies",
            "/api/v1/studies/{id}",
            "/api/v1/studies/{id}/interpretation",
            "/api/v1/studies/{id}/analysis",
            "/api/v1/studies/{id}/report",
            "/api/v1/profile",
            "/api/v1/draft",
            "/api/v1/statistics",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_domain_schemas_registered() {
        let openapi = ApiDoc::openapi();
        let schemas = &openapi.components.as_ref().expect("components are defined").schemas;

        assert!(schemas.contains_key("StudyMeasurementBuilder"));
        assert!(schemas.contains_key("DiagnosticReport"));
        assert!(schemas.contains_key("AnalysisOutcome"));
    }
}
