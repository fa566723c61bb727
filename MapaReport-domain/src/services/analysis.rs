use crate::entities::{MeasurementPeriod, StudyAnalysis, StudyMeasurement};
use super::classifier::{classify_blood_pressure, classify_dipping, classify_hypertensive_load, classify_pulse_pressure};

/// Classify every dimension of a study.
///
/// An absent optional value compares false against every band, so it reads as
/// non-dipper for dipping and normal for pulse pressure and load.
pub fn analyze(study: &StudyMeasurement) -> StudyAnalysis {
    let classify_period = |period| {
        let (systolic, diastolic) = study.averages(period);
        classify_blood_pressure(systolic, diastolic, period)
    };
    let or_nan = |value: Option<f64>| value.unwrap_or(f64::NAN);

    let twenty_four_hour = classify_period(MeasurementPeriod::TwentyFourHour);
    let day = classify_period(MeasurementPeriod::Day);
    let night = classify_period(MeasurementPeriod::Night);

    StudyAnalysis {
        twenty_four_hour,
        day,
        night,
        systolic_dipping: classify_dipping(or_nan(study.dipping_systolic)),
        diastolic_dipping: classify_dipping(or_nan(study.dipping_diastolic)),
        pulse_pressure: classify_pulse_pressure(or_nan(study.pulse_pressure)),
        systolic_load: classify_hypertensive_load(or_nan(study.load_systolic)),
        diastolic_load: classify_hypertensive_load(or_nan(study.load_diastolic)),
        hypertension_confirmed: twenty_four_hour.is_hypertensive || day.is_hypertensive || night.is_hypertensive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DippingPattern, RiskLabel, StudyMeasurementBuilder};
    use chrono::NaiveDate;

    fn base() -> StudyMeasurementBuilder {
        StudyMeasurementBuilder::new()
            .study_date(NaiveDate::from_ymd_opt(2024, 2, 20).unwrap())
            .averages(MeasurementPeriod::TwentyFourHour, 128.0, 78.0)
            .averages(MeasurementPeriod::Day, 133.0, 83.0)
            .averages(MeasurementPeriod::Night, 122.0, 68.0)
    }

    #[test]
    fn test_analysis_classifies_each_dimension() {
        let study = base().dipping(12.0, 22.0).pulse_pressure(57.0).loads(30.0, 41.0).build().unwrap();
        let analysis = analyze(&study);

        assert!(!analysis.twenty_four_hour.is_hypertensive);
        assert!(!analysis.day.is_hypertensive);
        assert!(analysis.night.is_hypertensive);
        assert!(analysis.hypertension_confirmed);
        assert_eq!(analysis.hypertensive_periods(), vec![MeasurementPeriod::Night]);
        assert_eq!(analysis.systolic_dipping, DippingPattern::NormalDipper);
        assert_eq!(analysis.diastolic_dipping, DippingPattern::ExtremeDipper);
        assert_eq!(analysis.pulse_pressure, RiskLabel::Elevated);
        assert_eq!(analysis.systolic_load, RiskLabel::Normal);
        assert_eq!(analysis.diastolic_load, RiskLabel::Elevated);
    }

    #[test]
    fn test_absent_optional_values() {
        let analysis = analyze(&base().build().unwrap());
        assert_eq!(analysis.systolic_dipping, DippingPattern::NonDipper);
        assert_eq!(analysis.diastolic_dipping, DippingPattern::NonDipper);
        assert_eq!(analysis.pulse_pressure, RiskLabel::Normal);
        assert_eq!(analysis.systolic_load, RiskLabel::Normal);
        assert_eq!(analysis.diastolic_load, RiskLabel::Normal);
    }
}
