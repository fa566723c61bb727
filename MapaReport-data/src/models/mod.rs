// Storage models, one file per persisted aggregate
pub mod patient;
pub mod profile;
pub mod report;
pub mod study;

pub use patient::{CreatePatientRequest, Patient};
pub use profile::AuthoringProfile;
pub use report::StoredReport;
pub use study::{CreateStudyRequest, Study, StudyDraft, StudyFields};
