// Repository module structure
pub mod errors;
mod in_memory;
mod patient;
mod profile;
mod storage;
mod study;

use tracing::{debug, error};

use crate::database::{get_db_pool, DatabaseError, DatabasePool};

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryStorage;
pub use patient::{PatientRepository, PatientRepositoryTrait};
pub use profile::{ProfileRepository, ProfileRepositoryTrait};
pub use study::{StudyRepository, StudyRepositoryTrait};

/// Run `db_op` against the shared pool, or `memory_op` when the pool is missing or fails.
///
/// Duplicate and validation errors come from the data itself and are returned as-is.
pub(crate) fn with_fallback<T>(
    operation: &str,
    db_op: impl FnOnce(&DatabasePool) -> Result<T, RepositoryError>,
    memory_op: impl FnOnce() -> Result<T, RepositoryError>,
) -> Result<T, RepositoryError> {
    fallback_on(get_db_pool(), operation, db_op, memory_op)
}

fn fallback_on<T>(
    pool: Result<DatabasePool, DatabaseError>,
    operation: &str,
    db_op: impl FnOnce(&DatabasePool) -> Result<T, RepositoryError>,
    memory_op: impl FnOnce() -> Result<T, RepositoryError>,
) -> Result<T, RepositoryError> {
    match pool {
        Ok(pool) => match db_op(&pool) {
            Err(e @ (RepositoryError::Duplicate(_) | RepositoryError::Validation(_))) => Err(e),
            Err(e) => {
                error!("Failed to {} in database: {}", operation, e);
                memory_op()
            }
            ok => ok,
        },
        Err(e) => {
            debug!("Database not available ({}), using in-memory storage for {}", e, operation);
            memory_op()
        }
    }
}

#[cfg(test)]
mod fallback_tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Arc;

    use crate::database::{create_in_memory_pool, run_migrations};
    use crate::models::Patient;
    use super::storage::DatabaseStorage;

    fn test_pool() -> DatabasePool {
        let pool = DatabasePool::SQLite(Arc::new(create_in_memory_pool().unwrap()));
        run_migrations(&pool).unwrap();
        pool
    }

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.to_string(),
            full_name: "Jorge Muñoz".to_string(),
            age: 67,
            identity_number: "12.345.678-5".to_string(),
            normalized_identity: "123456785".to_string(),
            sex: "Male".to_string(),
            phone: None,
            email: None,
            diseases: None,
            medications: None,
            registered_at: "2024-03-01T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_duplicate_is_returned_without_touching_memory() {
        let memory_called = Cell::new(false);

        let result: Result<(), RepositoryError> = fallback_on(
            Ok(test_pool()),
            "store patient",
            |_| Err(RepositoryError::Duplicate("taken".to_string())),
            || {
                memory_called.set(true);
                Ok(())
            },
        );

        assert!(matches!(result, Err(RepositoryError::Duplicate(ref msg)) if msg == "taken"));
        assert!(!memory_called.get());
    }

    #[test]
    fn test_validation_error_is_returned_without_touching_memory() {
        let memory_called = Cell::new(false);

        let result: Result<(), RepositoryError> = fallback_on(
            Ok(test_pool()),
            "store study",
            |_| Err(RepositoryError::Validation("bad payload".to_string())),
            || {
                memory_called.set(true);
                Ok(())
            },
        );

        assert!(matches!(result, Err(RepositoryError::Validation(_))));
        assert!(!memory_called.get());
    }

    #[test]
    fn test_database_failure_falls_back_to_memory() {
        let result = fallback_on(
            Ok(test_pool()),
            "count patients",
            |_| Err(RepositoryError::Lock("poisoned".to_string())),
            || Ok(7usize),
        );

        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_missing_pool_uses_memory_only() {
        let db_called = Cell::new(false);

        let result = fallback_on(
            Err(DatabaseError::PoolNotInitialized),
            "count patients",
            |_| {
                db_called.set(true);
                Ok(1usize)
            },
            || Ok(3usize),
        );

        assert_eq!(result.unwrap(), 3);
        assert!(!db_called.get());
    }

    #[test]
    fn test_constraint_rejection_is_not_stored_in_memory() {
        let pool = test_pool();
        let memory = InMemoryStorage::new();
        DatabaseStorage::store_patient(&pool, &patient("p1")).unwrap();

        let second = patient("p2");
        let result = fallback_on(
            Ok(pool),
            "store patient",
            |pool| DatabaseStorage::store_patient(pool, &second).map(|_| second.clone()),
            || memory.store_patient(&second),
        );

        assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
        assert_eq!(memory.count_patients().unwrap(), 0);
    }
}

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    pub use super::patient::tests::MockPatientRepository;
    pub use super::profile::tests::MockProfileRepository;
    pub use super::study::tests::MockStudyRepository;
}
