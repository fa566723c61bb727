use async_trait::async_trait;

use crate::models::AuthoringProfile;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;
use super::with_fallback;

/// Repository trait for the single authoring profile
#[async_trait]
pub trait ProfileRepositoryTrait {
    /// The stored profile, if one was ever saved
    async fn get(&self) -> Result<Option<AuthoringProfile>, RepositoryError>;

    /// Replace the stored profile
    async fn save(&self, profile: AuthoringProfile) -> Result<AuthoringProfile, RepositoryError>;

    /// Remove the stored profile
    async fn reset(&self) -> Result<(), RepositoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRepository {
    storage: InMemoryStorage,
}

impl ProfileRepository {
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn get(&self) -> Result<Option<AuthoringProfile>, RepositoryError> {
        with_fallback("get profile", DatabaseStorage::get_profile, || self.storage.get_profile())
    }

    async fn save(&self, profile: AuthoringProfile) -> Result<AuthoringProfile, RepositoryError> {
        with_fallback(
            "store profile",
            |pool| DatabaseStorage::store_profile(pool, &profile).map(|_| profile.clone()),
            || self.storage.store_profile(&profile),
        )
    }

    async fn reset(&self) -> Result<(), RepositoryError> {
        with_fallback("clear profile", DatabaseStorage::clear_profile, || self.storage.clear_profile())
    }
}

/// Mock profile repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockProfileRepository {
        profile: Mutex<Option<AuthoringProfile>>,
    }

    impl MockProfileRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with a stored profile
        pub fn with_profile(profile: AuthoringProfile) -> Self {
            Self { profile: Mutex::new(Some(profile)) }
        }
    }

    #[async_trait]
    impl ProfileRepositoryTrait for MockProfileRepository {
        async fn get(&self) -> Result<Option<AuthoringProfile>, RepositoryError> {
            Ok(self.profile.lock()?.clone())
        }

        async fn save(&self, profile: AuthoringProfile) -> Result<AuthoringProfile, RepositoryError> {
            *self.profile.lock()? = Some(profile.clone());
            Ok(profile)
        }

        async fn reset(&self) -> Result<(), RepositoryError> {
            *self.profile.lock()? = None;
            Ok(())
        }
    }

}
