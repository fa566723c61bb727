use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Recording window a blood pressure average belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum MeasurementPeriod {
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "night")]
    Night,
}

impl MeasurementPeriod {
    /// All periods in reporting order
    pub const ALL: [MeasurementPeriod; 3] = [
        MeasurementPeriod::TwentyFourHour,
        MeasurementPeriod::Day,
        MeasurementPeriod::Night,
    ];
}

impl fmt::Display for MeasurementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MeasurementPeriod::TwentyFourHour => "24h",
            MeasurementPeriod::Day => "day",
            MeasurementPeriod::Night => "night",
        };
        f.write_str(s)
    }
}

/// Blood pressure label for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum BloodPressureLabel {
    Hypertension,
    Normal,
}

impl fmt::Display for BloodPressureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BloodPressureLabel::Hypertension => f.write_str("Hypertension"),
            BloodPressureLabel::Normal => f.write_str("Normal"),
        }
    }
}

/// Outcome of classifying one period's systolic/diastolic average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodPressureClassification {
    pub is_hypertensive: bool,
    pub label: BloodPressureLabel,
}

impl BloodPressureClassification {
    pub fn from_flag(is_hypertensive: bool) -> Self {
        let label = if is_hypertensive {
            BloodPressureLabel::Hypertension
        } else {
            BloodPressureLabel::Normal
        };
        Self { is_hypertensive, label }
    }
}

/// Nocturnal dipping pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum DippingPattern {
    ExtremeDipper,
    NormalDipper,
    ReducedDipper,
    NonDipper,
}

impl fmt::Display for DippingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DippingPattern::ExtremeDipper => "Extreme dipper",
            DippingPattern::NormalDipper => "Normal dipper",
            DippingPattern::ReducedDipper => "Reduced dipper",
            DippingPattern::NonDipper => "Non-dipper",
        };
        f.write_str(s)
    }
}

/// Two-level label used for pulse pressure and hypertensive load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum RiskLabel {
    Normal,
    Elevated,
}

impl RiskLabel {
    pub fn is_elevated(self) -> bool {
        self == RiskLabel::Elevated
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::Normal => f.write_str("Normal"),
            RiskLabel::Elevated => f.write_str("Elevated"),
        }
    }
}

/// Classification of every dimension of one study, unformatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StudyAnalysis {
    pub twenty_four_hour: BloodPressureClassification,
    pub day: BloodPressureClassification,
    pub night: BloodPressureClassification,
    pub systolic_dipping: DippingPattern,
    /// Shown in the report; does not drive interpretation
    pub diastolic_dipping: DippingPattern,
    pub pulse_pressure: RiskLabel,
    pub systolic_load: RiskLabel,
    pub diastolic_load: RiskLabel,
    /// True when any period is hypertensive
    pub hypertension_confirmed: bool,
}

impl StudyAnalysis {
    /// Classification for a single period
    pub fn period(&self, period: MeasurementPeriod) -> BloodPressureClassification {
        match period {
            MeasurementPeriod::TwentyFourHour => self.twenty_four_hour,
            MeasurementPeriod::Day => self.day,
            MeasurementPeriod::Night => self.night,
        }
    }

    /// Hypertensive periods in reporting order
    pub fn hypertensive_periods(&self) -> Vec<MeasurementPeriod> {
        MeasurementPeriod::ALL
            .into_iter()
            .filter(|p| self.period(*p).is_hypertensive)
            .collect()
    }
}
