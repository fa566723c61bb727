// Domain entities and value objects
pub mod classification;
pub mod conversions;
pub mod interpretation;
pub mod patient;
pub mod profile;
pub mod report;
pub mod study;

// Re-export common types for easier imports
pub use classification::{
    BloodPressureClassification, BloodPressureLabel, DippingPattern, MeasurementPeriod, RiskLabel, StudyAnalysis,
};
pub use interpretation::{Finding, Statement, StatementCategory, StudyInterpretation};
pub use patient::{CreatePatientRequest, Patient, Sex};
pub use profile::{AuthoringProfile, UpdateProfileRequest};
pub use report::{DiagnosticReport, ReportSignature, StoredDiagnosticReport};
pub use study::{
    CreateStudyRequest, IncompleteStudy, Statistics, Study, StudyDraft, StudyHistoryEntry, StudyMeasurement,
    StudyMeasurementBuilder,
};
