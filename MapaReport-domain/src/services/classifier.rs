//! Threshold classification of ABPM measurements.
//!
//! Every function is total: any numeric input, including NaN or physiologically
//! implausible values, gets a definite label.

use crate::entities::{BloodPressureClassification, DippingPattern, MeasurementPeriod, RiskLabel};
use super::criteria::MEDICAL_CRITERIA;

/// Hypertensive when systolic OR diastolic meets the period threshold
pub fn classify_blood_pressure(systolic: f64, diastolic: f64, period: MeasurementPeriod) -> BloodPressureClassification {
    let threshold = MEDICAL_CRITERIA.threshold(period);
    BloodPressureClassification::from_flag(systolic >= threshold.systolic || diastolic >= threshold.diastolic)
}

/// Dipping pattern; bands are checked extreme, normal, reduced, in that order
pub fn classify_dipping(percent: f64) -> DippingPattern {
    let bands = &MEDICAL_CRITERIA.dipping;

    if percent >= bands.extreme.min {
        DippingPattern::ExtremeDipper
    } else if percent >= bands.normal.min && percent <= bands.normal.max {
        DippingPattern::NormalDipper
    } else if percent >= bands.reduced.min && percent < bands.normal.min {
        DippingPattern::ReducedDipper
    } else {
        DippingPattern::NonDipper
    }
}

pub fn classify_pulse_pressure(value: f64) -> RiskLabel {
    elevated_if_above(value, MEDICAL_CRITERIA.pulse_pressure.elevated_above)
}

/// Applied separately to systolic and diastolic load
pub fn classify_hypertensive_load(value: f64) -> RiskLabel {
    elevated_if_above(value, MEDICAL_CRITERIA.hypertensive_load.elevated_above)
}

fn elevated_if_above(value: f64, limit: f64) -> RiskLabel {
    if value > limit {
        RiskLabel::Elevated
    } else {
        RiskLabel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BloodPressureLabel;

    #[test]
    fn test_blood_pressure_single_component_is_enough() {
        let result = classify_blood_pressure(130.0, 79.0, MeasurementPeriod::TwentyFourHour);
        assert!(result.is_hypertensive);
        assert_eq!(result.label, BloodPressureLabel::Hypertension);

        let result = classify_blood_pressure(129.0, 79.0, MeasurementPeriod::TwentyFourHour);
        assert!(!result.is_hypertensive);
        assert_eq!(result.label, BloodPressureLabel::Normal);

        assert!(classify_blood_pressure(100.0, 80.0, MeasurementPeriod::TwentyFourHour).is_hypertensive);
    }

    #[test]
    fn test_blood_pressure_period_thresholds() {
        assert!(!classify_blood_pressure(134.9, 84.9, MeasurementPeriod::Day).is_hypertensive);
        assert!(classify_blood_pressure(135.0, 60.0, MeasurementPeriod::Day).is_hypertensive);
        assert!(classify_blood_pressure(110.0, 85.0, MeasurementPeriod::Day).is_hypertensive);

        assert!(!classify_blood_pressure(119.0, 69.0, MeasurementPeriod::Night).is_hypertensive);
        assert!(classify_blood_pressure(120.0, 50.0, MeasurementPeriod::Night).is_hypertensive);
        assert!(classify_blood_pressure(100.0, 70.0, MeasurementPeriod::Night).is_hypertensive);
    }

    #[test]
    fn test_dipping_boundaries() {
        assert_eq!(classify_dipping(20.0), DippingPattern::ExtremeDipper);
        assert_eq!(classify_dipping(35.0), DippingPattern::ExtremeDipper);
        assert_eq!(classify_dipping(19.99), DippingPattern::NormalDipper);
        assert_eq!(classify_dipping(10.0), DippingPattern::NormalDipper);
        assert_eq!(classify_dipping(9.99), DippingPattern::ReducedDipper);
        assert_eq!(classify_dipping(1.0), DippingPattern::ReducedDipper);
        assert_eq!(classify_dipping(0.9), DippingPattern::NonDipper);
        assert_eq!(classify_dipping(-5.0), DippingPattern::NonDipper);
        assert_eq!(classify_dipping(f64::NAN), DippingPattern::NonDipper);
    }

    #[test]
    fn test_pulse_pressure_boundary() {
        assert_eq!(classify_pulse_pressure(55.0), RiskLabel::Normal);
        assert_eq!(classify_pulse_pressure(55.01), RiskLabel::Elevated);
        assert_eq!(classify_pulse_pressure(56.0), RiskLabel::Elevated);
    }

    #[test]
    fn test_hypertensive_load_boundary() {
        assert_eq!(classify_hypertensive_load(40.0), RiskLabel::Normal);
        assert_eq!(classify_hypertensive_load(41.0), RiskLabel::Elevated);
        assert_eq!(classify_hypertensive_load(f64::NAN), RiskLabel::Normal);
    }
}
