use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::classification::MeasurementPeriod;

/// A complete ABPM measurement set.
///
/// New measurements go through [`StudyMeasurementBuilder::build`], which checks
/// that every value is finite, the six period averages are non-negative and
/// quality lies in `[0, 100]`. Stored studies are rebuilt the same way on load;
/// a value deserialized directly (for example inside a stored report) is not
/// rechecked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StudyMeasurement {
    pub study_date: NaiveDate,
    /// Recording duration as written by the operator
    pub duration: Option<String>,
    /// Percentage of valid readings
    pub quality: Option<f64>,
    pub device: Option<String>,

    pub avg_24h_systolic: f64,
    pub avg_24h_diastolic: f64,
    pub avg_day_systolic: f64,
    pub avg_day_diastolic: f64,
    pub avg_night_systolic: f64,
    pub avg_night_diastolic: f64,

    /// Systolic nocturnal dipping, percent
    pub dipping_systolic: Option<f64>,
    /// Diastolic nocturnal dipping, percent
    pub dipping_diastolic: Option<f64>,
    /// Systolic hypertensive load, percent
    pub load_systolic: Option<f64>,
    /// Diastolic hypertensive load, percent
    pub load_diastolic: Option<f64>,
    /// mmHg
    pub pulse_pressure: Option<f64>,
    /// Beats per minute
    pub avg_heart_rate: Option<f64>,

    pub clinical_findings: Option<String>,
    pub additional_notes: Option<String>,
}

impl StudyMeasurement {
    /// Start a new builder
    pub fn builder() -> StudyMeasurementBuilder {
        StudyMeasurementBuilder::default()
    }

    /// Systolic and diastolic averages for a period
    pub fn averages(&self, period: MeasurementPeriod) -> (f64, f64) {
        match period {
            MeasurementPeriod::TwentyFourHour => (self.avg_24h_systolic, self.avg_24h_diastolic),
            MeasurementPeriod::Day => (self.avg_day_systolic, self.avg_day_diastolic),
            MeasurementPeriod::Night => (self.avg_night_systolic, self.avg_night_diastolic),
        }
    }

    /// Turn the measurement back into a builder, e.g. to save it as a draft
    pub fn to_builder(&self) -> StudyMeasurementBuilder {
        StudyMeasurementBuilder {
            study_date: Some(self.study_date),
            duration: self.duration.clone(),
            quality: self.quality,
            device: self.device.clone(),
            avg_24h_systolic: Some(self.avg_24h_systolic),
            avg_24h_diastolic: Some(self.avg_24h_diastolic),
            avg_day_systolic: Some(self.avg_day_systolic),
            avg_day_diastolic: Some(self.avg_day_diastolic),
            avg_night_systolic: Some(self.avg_night_systolic),
            avg_night_diastolic: Some(self.avg_night_diastolic),
            dipping_systolic: self.dipping_systolic,
            dipping_diastolic: self.dipping_diastolic,
            load_systolic: self.load_systolic,
            load_diastolic: self.load_diastolic,
            pulse_pressure: self.pulse_pressure,
            avg_heart_rate: self.avg_heart_rate,
            clinical_findings: self.clinical_findings.clone(),
            additional_notes: self.additional_notes.clone(),
        }
    }
}

/// Why a measurement set could not be built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IncompleteStudy {
    /// Mandatory fields absent, in field order
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl IncompleteStudy {
    /// Names of the missing mandatory fields, empty for value errors
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            IncompleteStudy::MissingFields(fields) => fields,
            IncompleteStudy::InvalidValue { .. } => &[],
        }
    }
}

/// Field-by-field construction of a [`StudyMeasurement`].
///
/// Every field may be missing, which also makes this the shape of a saved draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct StudyMeasurementBuilder {
    pub study_date: Option<NaiveDate>,
    pub duration: Option<String>,
    pub quality: Option<f64>,
    pub device: Option<String>,
    pub avg_24h_systolic: Option<f64>,
    pub avg_24h_diastolic: Option<f64>,
    pub avg_day_systolic: Option<f64>,
    pub avg_day_diastolic: Option<f64>,
    pub avg_night_systolic: Option<f64>,
    pub avg_night_diastolic: Option<f64>,
    pub dipping_systolic: Option<f64>,
    pub dipping_diastolic: Option<f64>,
    pub load_systolic: Option<f64>,
    pub load_diastolic: Option<f64>,
    pub pulse_pressure: Option<f64>,
    pub avg_heart_rate: Option<f64>,
    pub clinical_findings: Option<String>,
    pub additional_notes: Option<String>,
}

impl StudyMeasurementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn study_date(mut self, date: NaiveDate) -> Self {
        self.study_date = Some(date);
        self
    }

    /// Set the systolic and diastolic averages of one period
    pub fn averages(mut self, period: MeasurementPeriod, systolic: f64, diastolic: f64) -> Self {
        let (sys, dia) = match period {
            MeasurementPeriod::TwentyFourHour => (&mut self.avg_24h_systolic, &mut self.avg_24h_diastolic),
            MeasurementPeriod::Day => (&mut self.avg_day_systolic, &mut self.avg_day_diastolic),
            MeasurementPeriod::Night => (&mut self.avg_night_systolic, &mut self.avg_night_diastolic),
        };
        *sys = Some(systolic);
        *dia = Some(diastolic);
        self
    }

    pub fn dipping(mut self, systolic: f64, diastolic: f64) -> Self {
        self.dipping_systolic = Some(systolic);
        self.dipping_diastolic = Some(diastolic);
        self
    }

    pub fn loads(mut self, systolic: f64, diastolic: f64) -> Self {
        self.load_systolic = Some(systolic);
        self.load_diastolic = Some(diastolic);
        self
    }

    pub fn pulse_pressure(mut self, value: f64) -> Self {
        self.pulse_pressure = Some(value);
        self
    }

    pub fn avg_heart_rate(mut self, value: f64) -> Self {
        self.avg_heart_rate = Some(value);
        self
    }

    pub fn quality(mut self, percent: f64) -> Self {
        self.quality = Some(percent);
        self
    }

    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn clinical_findings(mut self, text: impl Into<String>) -> Self {
        self.clinical_findings = Some(text.into());
        self
    }

    pub fn additional_notes(mut self, text: impl Into<String>) -> Self {
        self.additional_notes = Some(text.into());
        self
    }

    /// Validate and produce a complete measurement.
    ///
    /// Missing mandatory fields are reported together, before any value check.
    pub fn build(&self) -> Result<StudyMeasurement, IncompleteStudy> {
        let mandatory = [
            ("avg_24h_systolic", self.avg_24h_systolic),
            ("avg_24h_diastolic", self.avg_24h_diastolic),
            ("avg_day_systolic", self.avg_day_systolic),
            ("avg_day_diastolic", self.avg_day_diastolic),
            ("avg_night_systolic", self.avg_night_systolic),
            ("avg_night_diastolic", self.avg_night_diastolic),
        ];

        let mut missing = Vec::new();
        if self.study_date.is_none() {
            missing.push("study_date");
        }
        missing.extend(mandatory.iter().filter(|(_, v)| v.is_none()).map(|(name, _)| *name));
        if !missing.is_empty() {
            return Err(IncompleteStudy::MissingFields(missing));
        }

        for (field, value) in mandatory {
            if let Some(v) = value {
                check_finite(field, v)?;
                if v < 0.0 {
                    return Err(IncompleteStudy::InvalidValue {
                        field,
                        reason: format!("{} is negative", v),
                    });
                }
            }
        }

        let optional = [
            ("dipping_systolic", self.dipping_systolic),
            ("dipping_diastolic", self.dipping_diastolic),
            ("load_systolic", self.load_systolic),
            ("load_diastolic", self.load_diastolic),
            ("pulse_pressure", self.pulse_pressure),
            ("avg_heart_rate", self.avg_heart_rate),
            ("quality", self.quality),
        ];
        for (field, value) in optional {
            if let Some(v) = value {
                check_finite(field, v)?;
            }
        }

        if let Some(q) = self.quality {
            if !(0.0..=100.0).contains(&q) {
                return Err(IncompleteStudy::InvalidValue {
                    field: "quality",
                    reason: format!("{} is outside 0-100", q),
                });
            }
        }

        Ok(StudyMeasurement {
            study_date: self.study_date.ok_or(IncompleteStudy::MissingFields(vec!["study_date"]))?,
            duration: self.duration.clone(),
            quality: self.quality,
            device: self.device.clone(),
            avg_24h_systolic: self.avg_24h_systolic.unwrap_or_default(),
            avg_24h_diastolic: self.avg_24h_diastolic.unwrap_or_default(),
            avg_day_systolic: self.avg_day_systolic.unwrap_or_default(),
            avg_day_diastolic: self.avg_day_diastolic.unwrap_or_default(),
            avg_night_systolic: self.avg_night_systolic.unwrap_or_default(),
            avg_night_diastolic: self.avg_night_diastolic.unwrap_or_default(),
            dipping_systolic: self.dipping_systolic,
            dipping_diastolic: self.dipping_diastolic,
            load_systolic: self.load_systolic,
            load_diastolic: self.load_diastolic,
            pulse_pressure: self.pulse_pressure,
            avg_heart_rate: self.avg_heart_rate,
            clinical_findings: self.clinical_findings.clone(),
            additional_notes: self.additional_notes.clone(),
        })
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), IncompleteStudy> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(IncompleteStudy::InvalidValue {
            field,
            reason: "value is not a finite number".to_string(),
        })
    }
}

/// A recorded study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Study {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub measurement: StudyMeasurement,
}

/// Request payload for recording a study
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateStudyRequest {
    pub patient_id: String,
    pub measurement: StudyMeasurementBuilder,
}

/// The single in-progress study form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StudyDraft {
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub measurement: StudyMeasurementBuilder,
    pub saved_at: Option<DateTime<Utc>>,
}

/// One row of the study history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StudyHistoryEntry {
    pub study_id: Uuid,
    pub patient_id: Uuid,
    /// Patient name, or "patient not found" when the patient record is gone
    pub patient_name: String,
    pub study_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub avg_24h_systolic: f64,
    pub avg_24h_diastolic: f64,
    pub dipping_systolic: Option<f64>,
    pub quality: Option<f64>,
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Statistics {
    pub patients: usize,
    pub studies: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> StudyMeasurementBuilder {
        StudyMeasurementBuilder::new()
            .study_date(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap())
            .averages(MeasurementPeriod::TwentyFourHour, 135.0, 85.0)
            .averages(MeasurementPeriod::Day, 140.0, 90.0)
            .averages(MeasurementPeriod::Night, 125.0, 75.0)
    }

    #[test]
    fn test_build_complete_measurement() {
        let study = complete_builder().dipping(5.0, 8.0).quality(95.0).build().unwrap();
        assert_eq!(study.averages(MeasurementPeriod::Day), (140.0, 90.0));
        assert_eq!(study.dipping_systolic, Some(5.0));
        assert_eq!(study.pulse_pressure, None);
    }

    #[test]
    fn test_missing_fields_listed_in_order() {
        let builder = StudyMeasurementBuilder::new()
            .averages(MeasurementPeriod::Day, 140.0, 90.0);

        let err = builder.build().unwrap_err();
        assert_eq!(
            err.missing_fields(),
            &[
                "study_date",
                "avg_24h_systolic",
                "avg_24h_diastolic",
                "avg_night_systolic",
                "avg_night_diastolic",
            ]
        );
        assert!(err.to_string().starts_with("missing required fields: study_date"));
    }

    #[test]
    fn test_rejects_non_finite_and_negative_values() {
        let err = complete_builder().pulse_pressure(f64::NAN).build().unwrap_err();
        assert!(matches!(err, IncompleteStudy::InvalidValue { field: "pulse_pressure", .. }));

        let err = complete_builder()
            .averages(MeasurementPeriod::Night, -1.0, 70.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, IncompleteStudy::InvalidValue { field: "avg_night_systolic", .. }));
    }

    #[test]
    fn test_quality_bounds() {
        assert!(complete_builder().quality(0.0).build().is_ok());
        assert!(complete_builder().quality(100.0).build().is_ok());
        let err = complete_builder().quality(100.5).build().unwrap_err();
        assert!(matches!(err, IncompleteStudy::InvalidValue { field: "quality", .. }));
    }

    #[test]
    fn test_negative_dipping_is_accepted() {
        let study = complete_builder().dipping(-5.0, -2.0).build().unwrap();
        assert_eq!(study.dipping_systolic, Some(-5.0));
    }

    #[test]
    fn test_to_builder_round_trips() {
        let study = complete_builder().loads(45.0, 50.0).device("Mobil-O-Graph").build().unwrap();
        assert_eq!(study.to_builder().build().unwrap(), study);
    }

    #[test]
    fn test_builder_deserializes_partial_json() {
        let builder: StudyMeasurementBuilder =
            serde_json::from_str(r#"{"study_date":"2024-04-02","avg_24h_systolic":131.5}"#).unwrap();
        assert_eq!(builder.avg_24h_systolic, Some(131.5));
        assert!(builder.avg_day_systolic.is_none());
    }
}
