use chrono::{DateTime, Utc};

use crate::entities::report::{REPORT_SUBTITLE, REPORT_TITLE};
use crate::entities::{AuthoringProfile, DiagnosticReport, Patient, ReportSignature, Statement, StudyMeasurement};
use super::analysis::analyze;

/// Compose the report document, stamped with the current time
pub fn assemble(
    patient: &Patient,
    study: &StudyMeasurement,
    interpretation: &[Statement],
    profile: &AuthoringProfile,
) -> DiagnosticReport {
    assemble_at(patient, study, interpretation, profile, Utc::now())
}

/// Compose the report document with an explicit generation time
pub fn assemble_at(
    patient: &Patient,
    study: &StudyMeasurement,
    interpretation: &[Statement],
    profile: &AuthoringProfile,
    generated_at: DateTime<Utc>,
) -> DiagnosticReport {
    let signature = ReportSignature::from(profile);

    DiagnosticReport {
        title: REPORT_TITLE.to_string(),
        subtitle: REPORT_SUBTITLE.to_string(),
        institution: signature.institution.clone(),
        patient: patient.clone(),
        study: study.clone(),
        analysis: analyze(study),
        statements: interpretation.to_vec(),
        signature,
        generated_at,
    }
}
