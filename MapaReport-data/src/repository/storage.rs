use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{AuthoringProfile, Patient, StoredReport, Study, StudyDraft, StudyFields};
use super::errors::RepositoryError;

const PATIENT_COLUMNS: &str = "id, full_name, age, identity_number, normalized_identity, sex, \
     phone, email, diseases, medications, registered_at";

/// Database storage operations
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Insert a patient. A unique-constraint failure on the normalized identity is a duplicate.
    pub fn store_patient(pool: &DatabasePool, patient: &Patient) -> Result<(), RepositoryError> {
        debug!("Storing patient in database: id={}", patient.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let result = conn.execute(
                    &format!("INSERT INTO patients ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)", PATIENT_COLUMNS),
                    params![
                        patient.id,
                        patient.full_name,
                        patient.age,
                        patient.identity_number,
                        patient.normalized_identity,
                        patient.sex,
                        patient.phone,
                        patient.email,
                        patient.diseases,
                        patient.medications,
                        patient.registered_at,
                    ],
                );

                match result {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        Err(RepositoryError::Duplicate(format!(
                            "patient with identity {} already exists",
                            patient.identity_number
                        )))
                    }
                    Err(e) => Err(RepositoryError::Sqlite(e)),
                }
            }
        }
    }

    /// Get all patients in registration order
    pub fn get_patients(pool: &DatabasePool) -> Result<Vec<Patient>, RepositoryError> {
        debug!("Getting all patients from database");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM patients ORDER BY registered_at ASC, id ASC",
                    PATIENT_COLUMNS
                ))?;

                let patients = stmt
                    .query_map([], patient_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(patients)
            }
        }
    }

    /// Get a patient by ID
    pub fn get_patient(pool: &DatabasePool, id: &str) -> Result<Option<Patient>, RepositoryError> {
        debug!("Getting patient by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let patient = conn
                    .query_row(
                        &format!("SELECT {} FROM patients WHERE id = ?1", PATIENT_COLUMNS),
                        [id],
                        patient_from_row,
                    )
                    .optional()?;

                Ok(patient)
            }
        }
    }

    /// Find a patient by normalized identity number
    pub fn find_patient_by_identity(pool: &DatabasePool, normalized_identity: &str) -> Result<Option<Patient>, RepositoryError> {
        debug!("Looking up patient by identity in database");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let patient = conn
                    .query_row(
                        &format!("SELECT {} FROM patients WHERE normalized_identity = ?1", PATIENT_COLUMNS),
                        [normalized_identity],
                        patient_from_row,
                    )
                    .optional()?;

                Ok(patient)
            }
        }
    }

    pub fn count_patients(pool: &DatabasePool) -> Result<usize, RepositoryError> {
        count_rows(pool, "patients")
    }

    /// Insert or replace a study
    pub fn store_study(pool: &DatabasePool, study: &Study) -> Result<(), RepositoryError> {
        debug!("Storing study in database: id={}", study.id);

        let payload = serde_json::to_string(&study.fields)?;

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    "INSERT OR REPLACE INTO studies (id, patient_id, created_at, payload) VALUES (?1, ?2, ?3, ?4)",
                    params![study.id, study.patient_id, study.created_at, payload],
                )?;
                Ok(())
            }
        }
    }

    /// Get all studies, newest first
    pub fn get_studies(pool: &DatabasePool) -> Result<Vec<Study>, RepositoryError> {
        debug!("Getting all studies from database");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(
                    "SELECT id, patient_id, created_at, payload FROM studies ORDER BY created_at DESC, id ASC",
                )?;

                let rows = stmt
                    .query_map([], study_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter().map(decode_study).collect()
            }
        }
    }

    /// Get a study by ID
    pub fn get_study(pool: &DatabasePool, id: &str) -> Result<Option<Study>, RepositoryError> {
        debug!("Getting study by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let row = conn
                    .query_row(
                        "SELECT id, patient_id, created_at, payload FROM studies WHERE id = ?1",
                        [id],
                        study_row,
                    )
                    .optional()?;

                row.map(decode_study).transpose()
            }
        }
    }

    pub fn count_studies(pool: &DatabasePool) -> Result<usize, RepositoryError> {
        count_rows(pool, "studies")
    }

    /// Insert a report, replacing the previous report for the same study
    pub fn store_report(pool: &DatabasePool, report: &StoredReport) -> Result<(), RepositoryError> {
        debug!("Storing report in database: study_id={}", report.study_id);

        let payload = serde_json::to_string(&report.payload)?;

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    "INSERT INTO reports (id, study_id, generated_at, payload) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(study_id) DO UPDATE SET
                        id = excluded.id,
                        generated_at = excluded.generated_at,
                        payload = excluded.payload",
                    params![report.id, report.study_id, report.generated_at, payload],
                )?;
                Ok(())
            }
        }
    }

    /// Get the latest report generated for a study
    pub fn get_report_for_study(pool: &DatabasePool, study_id: &str) -> Result<Option<StoredReport>, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let row = conn
                    .query_row(
                        "SELECT id, study_id, generated_at, payload FROM reports WHERE study_id = ?1",
                        [study_id],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, String>(3)?,
                            ))
                        },
                    )
                    .optional()?;

                match row {
                    Some((id, study_id, generated_at, payload)) => Ok(Some(StoredReport {
                        id,
                        study_id,
                        generated_at,
                        payload: serde_json::from_str(&payload)?,
                    })),
                    None => Ok(None),
                }
            }
        }
    }

    pub fn get_profile(pool: &DatabasePool) -> Result<Option<AuthoringProfile>, RepositoryError> {
        get_singleton(pool, "profile")
    }

    pub fn store_profile(pool: &DatabasePool, profile: &AuthoringProfile) -> Result<(), RepositoryError> {
        put_singleton(pool, "profile", profile)
    }

    pub fn clear_profile(pool: &DatabasePool) -> Result<(), RepositoryError> {
        clear_singleton(pool, "profile")
    }

    pub fn get_draft(pool: &DatabasePool) -> Result<Option<StudyDraft>, RepositoryError> {
        get_singleton(pool, "drafts")
    }

    pub fn store_draft(pool: &DatabasePool, draft: &StudyDraft) -> Result<(), RepositoryError> {
        put_singleton(pool, "drafts", draft)
    }

    pub fn clear_draft(pool: &DatabasePool) -> Result<(), RepositoryError> {
        clear_singleton(pool, "drafts")
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        full_name: row.get(1)?,
        age: row.get(2)?,
        identity_number: row.get(3)?,
        normalized_identity: row.get(4)?,
        sex: row.get(5)?,
        phone: row.get(6)?,
        email: row.get(7)?,
        diseases: row.get(8)?,
        medications: row.get(9)?,
        registered_at: row.get(10)?,
    })
}

type StudyRow = (String, String, String, String);

fn study_row(row: &Row<'_>) -> rusqlite::Result<StudyRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_study((id, patient_id, created_at, payload): StudyRow) -> Result<Study, RepositoryError> {
    let fields: StudyFields = serde_json::from_str(&payload)?;
    Ok(Study { id, patient_id, created_at, fields })
}

// Table names below are compile-time constants, never user input.

fn count_rows(pool: &DatabasePool, table: &'static str) -> Result<usize, RepositoryError> {
    match pool {
        DatabasePool::SQLite(pool) => {
            let conn = pool.get()?;
            let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(count as usize)
        }
    }
}

fn get_singleton<T: serde::de::DeserializeOwned>(pool: &DatabasePool, table: &'static str) -> Result<Option<T>, RepositoryError> {
    match pool {
        DatabasePool::SQLite(pool) => {
            let conn = pool.get()?;
            let payload: Option<String> = conn
                .query_row(&format!("SELECT payload FROM {} WHERE id = 1", table), [], |row| row.get(0))
                .optional()?;

            payload
                .map(|p| serde_json::from_str(&p).map_err(RepositoryError::from))
                .transpose()
        }
    }
}

fn put_singleton<T: serde::Serialize>(pool: &DatabasePool, table: &'static str, value: &T) -> Result<(), RepositoryError> {
    let payload = serde_json::to_string(value)?;

    match pool {
        DatabasePool::SQLite(pool) => {
            let conn = pool.get()?;
            conn.execute(
                &format!("INSERT OR REPLACE INTO {} (id, payload) VALUES (1, ?1)", table),
                [payload],
            )?;
            Ok(())
        }
    }
}

fn clear_singleton(pool: &DatabasePool, table: &'static str) -> Result<(), RepositoryError> {
    match pool {
        DatabasePool::SQLite(pool) => {
            let conn = pool.get()?;
            conn.execute(&format!("DELETE FROM {} WHERE id = 1", table), [])?;
            Ok(())
        }
    }
}
