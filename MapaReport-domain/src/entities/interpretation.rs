use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use uuid::Uuid;

use super::classification::{DippingPattern, MeasurementPeriod, StudyAnalysis};

/// Section of the diagnostic interpretation a statement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StatementCategory {
    Diagnosis,
    CircadianPattern,
    PulsePressure,
    HypertensiveLoad,
}

/// What a statement asserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum Finding {
    HypertensionConfirmed,
    PeriodHypertension(MeasurementPeriod),
    NormalBloodPressure,
    NonDipperRisk,
    ExtremeDipperEvaluation,
    /// Any dipping pattern that is neither non-dipper nor extreme
    NormalCircadianPattern(DippingPattern),
    ArterialStiffness,
    SuboptimalControl,
}

impl Finding {
    pub fn category(&self) -> StatementCategory {
        match self {
            Finding::HypertensionConfirmed
            | Finding::PeriodHypertension(_)
            | Finding::NormalBloodPressure => StatementCategory::Diagnosis,
            Finding::NonDipperRisk
            | Finding::ExtremeDipperEvaluation
            | Finding::NormalCircadianPattern(_) => StatementCategory::CircadianPattern,
            Finding::ArterialStiffness => StatementCategory::PulsePressure,
            Finding::SuboptimalControl => StatementCategory::HypertensiveLoad,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Finding::HypertensionConfirmed => "Hypertension confirmed by ABPM.".to_string(),
            Finding::PeriodHypertension(MeasurementPeriod::TwentyFourHour) => {
                "Hypertension in the 24-hour average.".to_string()
            }
            Finding::PeriodHypertension(MeasurementPeriod::Day) => "Daytime hypertension.".to_string(),
            Finding::PeriodHypertension(MeasurementPeriod::Night) => "Nighttime hypertension.".to_string(),
            Finding::NormalBloodPressure => "Normal blood pressure according to ABPM criteria.".to_string(),
            Finding::NonDipperRisk => {
                "Non-dipper pattern, associated with increased cardiovascular risk.".to_string()
            }
            Finding::ExtremeDipperEvaluation => {
                "Extreme dipper pattern, requires additional evaluation.".to_string()
            }
            Finding::NormalCircadianPattern(pattern) => format!("Normal circadian pattern ({}).", pattern),
            Finding::ArterialStiffness => "Elevated pulse pressure, suggests arterial stiffness.".to_string(),
            Finding::SuboptimalControl => {
                "Elevated hypertensive load, indicates suboptimal blood pressure control.".to_string()
            }
        }
    }
}

/// One plain-text unit of the diagnostic interpretation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Statement {
    pub category: StatementCategory,
    pub finding: Finding,
    pub message: String,
}

impl From<Finding> for Statement {
    fn from(finding: Finding) -> Self {
        Self {
            category: finding.category(),
            message: finding.message(),
            finding,
        }
    }
}

/// Deterministic interpretation of a recorded study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StudyInterpretation {
    pub study_id: Uuid,
    pub analysis: StudyAnalysis,
    pub statements: Vec<Statement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_dipper_keeps_normal_pattern_wording() {
        let statement = Statement::from(Finding::NormalCircadianPattern(DippingPattern::ReducedDipper));
        assert_eq!(statement.category, StatementCategory::CircadianPattern);
        assert_eq!(statement.message, "Normal circadian pattern (Reduced dipper).");
    }

    #[test]
    fn test_finding_serialization() {
        let json = serde_json::to_value(Finding::PeriodHypertension(MeasurementPeriod::Night)).unwrap();
        assert_eq!(json, serde_json::json!({ "code": "period_hypertension", "detail": "night" }));

        let json = serde_json::to_value(Finding::ArterialStiffness).unwrap();
        assert_eq!(json, serde_json::json!({ "code": "arterial_stiffness" }));
    }
}
