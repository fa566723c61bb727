use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use mapa_report_data::models as data;

use super::patient::{Patient, Sex};
use super::profile::AuthoringProfile;
use super::study::{Study, StudyDraft, StudyMeasurement, StudyMeasurementBuilder};

/// Conversion functions between domain entities and data models.
/// Names follow convert_to_[target_layer]_[model_name].

/// Helper function to safely parse a string ID to UUID
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp {}: {}", value, e))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("Invalid date {}: {}", value, e))
}

/// Identity number with periods and the first hyphen removed, check character lower-cased
pub fn normalize_identity(raw: &str) -> String {
    raw.trim().replace('.', "").replacen('-', "", 1).to_lowercase()
}

/// Convert from data model to domain entity for patient
pub fn convert_to_domain_patient(patient: data::Patient) -> Result<Patient, String> {
    Ok(Patient {
        id: parse_string_to_uuid(&patient.id)?,
        full_name: patient.full_name,
        age: patient.age,
        identity_number: patient.identity_number,
        sex: patient.sex.parse::<Sex>()?,
        phone: patient.phone,
        email: patient.email,
        diseases: patient.diseases,
        medications: patient.medications,
        registered_at: parse_timestamp(&patient.registered_at)?,
    })
}

/// Build the data create request for a validated intake
pub fn convert_to_data_create_patient(
    request: &super::patient::CreatePatientRequest,
    registered_at: DateTime<Utc>,
) -> data::CreatePatientRequest {
    data::CreatePatientRequest {
        full_name: request.full_name.trim().to_string(),
        age: request.age,
        identity_number: request.identity_number.trim().to_string(),
        normalized_identity: normalize_identity(&request.identity_number),
        sex: request.sex.to_string(),
        phone: request.phone.clone(),
        email: request.email.clone(),
        diseases: request.diseases.clone(),
        medications: request.medications.clone(),
        registered_at: registered_at.to_rfc3339(),
    }
}

/// Convert a complete measurement to the stored field set
pub fn convert_to_data_study_fields(measurement: &StudyMeasurement) -> data::StudyFields {
    data::StudyFields {
        study_date: measurement.study_date.format("%Y-%m-%d").to_string(),
        duration: measurement.duration.clone(),
        quality: measurement.quality,
        device: measurement.device.clone(),
        avg_24h_systolic: measurement.avg_24h_systolic,
        avg_24h_diastolic: measurement.avg_24h_diastolic,
        avg_day_systolic: measurement.avg_day_systolic,
        avg_day_diastolic: measurement.avg_day_diastolic,
        avg_night_systolic: measurement.avg_night_systolic,
        avg_night_diastolic: measurement.avg_night_diastolic,
        load_systolic: measurement.load_systolic,
        load_diastolic: measurement.load_diastolic,
        dipping_systolic: measurement.dipping_systolic,
        dipping_diastolic: measurement.dipping_diastolic,
        pulse_pressure: measurement.pulse_pressure,
        avg_heart_rate: measurement.avg_heart_rate,
        clinical_findings: measurement.clinical_findings.clone(),
        additional_notes: measurement.additional_notes.clone(),
    }
}

/// Convert stored fields back into a builder. Building it re-checks completeness.
pub fn convert_to_domain_builder(fields: &data::StudyFields) -> Result<StudyMeasurementBuilder, String> {
    Ok(StudyMeasurementBuilder {
        study_date: Some(parse_date(&fields.study_date)?),
        duration: fields.duration.clone(),
        quality: fields.quality,
        device: fields.device.clone(),
        avg_24h_systolic: Some(fields.avg_24h_systolic),
        avg_24h_diastolic: Some(fields.avg_24h_diastolic),
        avg_day_systolic: Some(fields.avg_day_systolic),
        avg_day_diastolic: Some(fields.avg_day_diastolic),
        avg_night_systolic: Some(fields.avg_night_systolic),
        avg_night_diastolic: Some(fields.avg_night_diastolic),
        dipping_systolic: fields.dipping_systolic,
        dipping_diastolic: fields.dipping_diastolic,
        load_systolic: fields.load_systolic,
        load_diastolic: fields.load_diastolic,
        pulse_pressure: fields.pulse_pressure,
        avg_heart_rate: fields.avg_heart_rate,
        clinical_findings: fields.clinical_findings.clone(),
        additional_notes: fields.additional_notes.clone(),
    })
}

/// Convert from data model to domain entity for study
pub fn convert_to_domain_study(study: data::Study) -> Result<Study, String> {
    let measurement = convert_to_domain_builder(&study.fields)?
        .build()
        .map_err(|e| format!("Stored study {} is not complete: {}", study.id, e))?;

    Ok(Study {
        id: parse_string_to_uuid(&study.id)?,
        patient_id: parse_string_to_uuid(&study.patient_id)?,
        created_at: parse_timestamp(&study.created_at)?,
        measurement,
    })
}

/// Convert from domain entity to data model for draft
pub fn convert_to_data_draft(draft: &StudyDraft) -> data::StudyDraft {
    let m = &draft.measurement;
    data::StudyDraft {
        patient_id: draft.patient_id.map(|id| id.to_string()),
        study_date: m.study_date.map(|d| d.format("%Y-%m-%d").to_string()),
        duration: m.duration.clone(),
        quality: m.quality,
        device: m.device.clone(),
        avg_24h_systolic: m.avg_24h_systolic,
        avg_24h_diastolic: m.avg_24h_diastolic,
        avg_day_systolic: m.avg_day_systolic,
        avg_day_diastolic: m.avg_day_diastolic,
        avg_night_systolic: m.avg_night_systolic,
        avg_night_diastolic: m.avg_night_diastolic,
        load_systolic: m.load_systolic,
        load_diastolic: m.load_diastolic,
        dipping_systolic: m.dipping_systolic,
        dipping_diastolic: m.dipping_diastolic,
        pulse_pressure: m.pulse_pressure,
        avg_heart_rate: m.avg_heart_rate,
        clinical_findings: m.clinical_findings.clone(),
        additional_notes: m.additional_notes.clone(),
        saved_at: draft.saved_at.map(|t| t.to_rfc3339()),
    }
}

/// Convert from data model to domain entity for draft
pub fn convert_to_domain_draft(draft: data::StudyDraft) -> Result<StudyDraft, String> {
    Ok(StudyDraft {
        patient_id: draft.patient_id.as_deref().map(parse_string_to_uuid).transpose()?,
        measurement: StudyMeasurementBuilder {
            study_date: draft.study_date.as_deref().map(parse_date).transpose()?,
            duration: draft.duration,
            quality: draft.quality,
            device: draft.device,
            avg_24h_systolic: draft.avg_24h_systolic,
            avg_24h_diastolic: draft.avg_24h_diastolic,
            avg_day_systolic: draft.avg_day_systolic,
            avg_day_diastolic: draft.avg_day_diastolic,
            avg_night_systolic: draft.avg_night_systolic,
            avg_night_diastolic: draft.avg_night_diastolic,
            dipping_systolic: draft.dipping_systolic,
            dipping_diastolic: draft.dipping_diastolic,
            load_systolic: draft.load_systolic,
            load_diastolic: draft.load_diastolic,
            pulse_pressure: draft.pulse_pressure,
            avg_heart_rate: draft.avg_heart_rate,
            clinical_findings: draft.clinical_findings,
            additional_notes: draft.additional_notes,
        },
        saved_at: draft.saved_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

/// Convert from domain entity to data model for profile
pub fn convert_to_data_profile(profile: &AuthoringProfile) -> data::AuthoringProfile {
    data::AuthoringProfile {
        name: profile.name.clone(),
        specialty: profile.specialty.clone(),
        institution: profile.institution.clone(),
        identity_number: profile.identity_number.clone(),
        registry: profile.registry.clone(),
        last_update: profile.last_update.map(|t| t.to_rfc3339()),
    }
}

/// Convert from data model to domain entity for profile
pub fn convert_to_domain_profile(profile: data::AuthoringProfile) -> Result<AuthoringProfile, String> {
    Ok(AuthoringProfile {
        name: profile.name,
        specialty: profile.specialty,
        institution: profile.institution,
        identity_number: profile.identity_number,
        registry: profile.registry,
        last_update: profile.last_update.as_deref().map(parse_timestamp).transpose()?,
    })
}
