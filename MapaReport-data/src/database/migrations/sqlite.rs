use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_patients_table(conn)?;
    create_studies_table(conn)?;
    create_reports_table(conn)?;
    create_profile_table(conn)?;
    create_drafts_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the patients table. The normalized identity is unique.
fn create_patients_table(conn: &Connection) -> Result<(), String> {
    info!("Creating patients table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS patients (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            age INTEGER NOT NULL,
            identity_number TEXT NOT NULL,
            normalized_identity TEXT NOT NULL UNIQUE,
            sex TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            diseases TEXT,
            medications TEXT,
            registered_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_patients_registered_at
        ON patients (registered_at DESC);",
    ).map_err(|e| format!("Failed to create patients table: {}", e))
}

/// Create the studies table; measurement fields are kept as a JSON payload
fn create_studies_table(conn: &Connection) -> Result<(), String> {
    info!("Creating studies table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS studies (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_studies_created_at
        ON studies (created_at DESC);",
    ).map_err(|e| format!("Failed to create studies table: {}", e))
}

/// Create the reports table, one report per study
fn create_reports_table(conn: &Connection) -> Result<(), String> {
    info!("Creating reports table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            study_id TEXT NOT NULL UNIQUE,
            generated_at TEXT NOT NULL,
            payload TEXT NOT NULL
        )",
        [],
    ).map_err(|e| format!("Failed to create reports table: {}", e))?;

    Ok(())
}

/// Create the single-row profile table
fn create_profile_table(conn: &Connection) -> Result<(), String> {
    info!("Creating profile table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profile (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            payload TEXT NOT NULL
        )",
        [],
    ).map_err(|e| format!("Failed to create profile table: {}", e))?;

    Ok(())
}

/// Create the single-row drafts table
fn create_drafts_table(conn: &Connection) -> Result<(), String> {
    info!("Creating drafts table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS drafts (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            payload TEXT NOT NULL
        )",
        [],
    ).map_err(|e| format!("Failed to create drafts table: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn test_duplicate_normalized_identity_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO patients
            (id, full_name, age, identity_number, normalized_identity, sex, registered_at)
            VALUES (?1, 'Ana', 40, '12.345.678-5', '123456785', 'Female', '2024-01-01T00:00:00Z')";

        conn.execute(insert, ["a"]).unwrap();
        assert!(conn.execute(insert, ["b"]).is_err());
    }
}
