use crate::entities::{DippingPattern, Finding, Statement, StudyAnalysis, StudyMeasurement};
use super::analysis::analyze;

/// Diagnostic interpretation of a study, in emission order:
/// diagnosis, circadian pattern, pulse pressure, hypertensive load.
pub fn interpret(study: &StudyMeasurement) -> Vec<Statement> {
    interpret_analysis(&analyze(study))
}

/// Interpretation of an already computed analysis
pub fn interpret_analysis(analysis: &StudyAnalysis) -> Vec<Statement> {
    let mut findings = Vec::new();

    if analysis.hypertension_confirmed {
        findings.push(Finding::HypertensionConfirmed);
        findings.extend(analysis.hypertensive_periods().into_iter().map(Finding::PeriodHypertension));
    } else {
        findings.push(Finding::NormalBloodPressure);
    }

    // Only systolic dipping drives the circadian statement.
    findings.push(match analysis.systolic_dipping {
        DippingPattern::NonDipper => Finding::NonDipperRisk,
        DippingPattern::ExtremeDipper => Finding::ExtremeDipperEvaluation,
        pattern => Finding::NormalCircadianPattern(pattern),
    });

    if analysis.pulse_pressure.is_elevated() {
        findings.push(Finding::ArterialStiffness);
    }

    if analysis.systolic_load.is_elevated() || analysis.diastolic_load.is_elevated() {
        findings.push(Finding::SuboptimalControl);
    }

    findings.into_iter().map(Statement::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MeasurementPeriod, StatementCategory, StudyMeasurementBuilder};
    use chrono::NaiveDate;

    fn study(
        avg_24h: (f64, f64),
        day: (f64, f64),
        night: (f64, f64),
        dipping_systolic: f64,
        pulse_pressure: f64,
        loads: (f64, f64),
    ) -> StudyMeasurement {
        StudyMeasurementBuilder::new()
            .study_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .averages(MeasurementPeriod::TwentyFourHour, avg_24h.0, avg_24h.1)
            .averages(MeasurementPeriod::Day, day.0, day.1)
            .averages(MeasurementPeriod::Night, night.0, night.1)
            .dipping(dipping_systolic, 0.0)
            .pulse_pressure(pulse_pressure)
            .loads(loads.0, loads.1)
            .build()
            .unwrap()
    }

    fn findings(statements: &[Statement]) -> Vec<Finding> {
        statements.iter().map(|s| s.finding).collect()
    }

    #[test]
    fn test_hypertensive_scenario() {
        let statements = interpret(&study((135.0, 85.0), (140.0, 90.0), (125.0, 75.0), 5.0, 60.0, (45.0, 50.0)));

        assert_eq!(
            findings(&statements),
            vec![
                Finding::HypertensionConfirmed,
                Finding::PeriodHypertension(MeasurementPeriod::TwentyFourHour),
                Finding::PeriodHypertension(MeasurementPeriod::Day),
                Finding::PeriodHypertension(MeasurementPeriod::Night),
                Finding::NormalCircadianPattern(DippingPattern::ReducedDipper),
                Finding::ArterialStiffness,
                Finding::SuboptimalControl,
            ]
        );

        let mut categories: Vec<StatementCategory> = statements.iter().map(|s| s.category).collect();
        categories.dedup();
        assert_eq!(
            categories,
            vec![
                StatementCategory::Diagnosis,
                StatementCategory::CircadianPattern,
                StatementCategory::PulsePressure,
                StatementCategory::HypertensiveLoad,
            ]
        );
        assert!(statements[4].message.contains("Reduced dipper"));
    }

    #[test]
    fn test_normal_scenario() {
        let statements = interpret(&study((120.0, 75.0), (125.0, 80.0), (105.0, 60.0), 15.0, 45.0, (10.0, 10.0)));

        assert_eq!(
            findings(&statements),
            vec![
                Finding::NormalBloodPressure,
                Finding::NormalCircadianPattern(DippingPattern::NormalDipper),
            ]
        );
        assert_eq!(statements[0].message, "Normal blood pressure according to ABPM criteria.");
    }

    #[test]
    fn test_only_flagged_periods_are_listed() {
        let statements = interpret(&study((125.0, 75.0), (130.0, 80.0), (121.0, 65.0), 12.0, 50.0, (20.0, 20.0)));
        assert_eq!(
            findings(&statements)[..2],
            [Finding::HypertensionConfirmed, Finding::PeriodHypertension(MeasurementPeriod::Night)]
        );
    }

    #[test]
    fn test_circadian_statement_follows_systolic_dipping() {
        let non_dipper = interpret(&study((120.0, 75.0), (125.0, 80.0), (105.0, 60.0), 0.5, 45.0, (10.0, 10.0)));
        assert_eq!(non_dipper[1].finding, Finding::NonDipperRisk);

        let extreme = interpret(&study((120.0, 75.0), (125.0, 80.0), (105.0, 60.0), 20.0, 45.0, (10.0, 10.0)));
        assert_eq!(extreme[1].finding, Finding::ExtremeDipperEvaluation);
        assert_eq!(extreme[1].message, "Extreme dipper pattern, requires additional evaluation.");
    }

    #[test]
    fn test_single_load_statement_when_both_loads_elevated() {
        let statements = interpret(&study((120.0, 75.0), (125.0, 80.0), (105.0, 60.0), 15.0, 45.0, (60.0, 70.0)));
        let load_statements = statements
            .iter()
            .filter(|s| s.category == StatementCategory::HypertensiveLoad)
            .count();
        assert_eq!(load_statements, 1);

        let one_load = interpret(&study((120.0, 75.0), (125.0, 80.0), (105.0, 60.0), 15.0, 45.0, (10.0, 41.0)));
        assert_eq!(one_load.last().map(|s| s.finding), Some(Finding::SuboptimalControl));
    }

    #[test]
    fn test_interpret_is_idempotent() {
        let measurement = study((135.0, 85.0), (140.0, 90.0), (125.0, 75.0), 5.0, 60.0, (45.0, 50.0));
        assert_eq!(interpret(&measurement), interpret(&measurement));
    }
}
