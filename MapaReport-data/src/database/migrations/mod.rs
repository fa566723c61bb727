// Schema for patients, studies, reports, the authoring profile and the study draft
mod sqlite;

pub use sqlite::run_migrations as run_sqlite_migrations;
