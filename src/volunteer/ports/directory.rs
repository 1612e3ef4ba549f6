//! Directory port for volunteer registration and lookup.

use crate::volunteer::domain::{Volunteer, VolunteerEmail, VolunteerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for volunteer directory operations.
pub type VolunteerDirectoryResult<T> = Result<T, VolunteerDirectoryError>;

/// Volunteer persistence and lookup contract.
#[async_trait]
pub trait VolunteerDirectory: Send + Sync {
    /// Stores a newly registered volunteer.
    ///
    /// # Errors
    ///
    /// Returns [`VolunteerDirectoryError::DuplicateVolunteer`] when the ID
    /// already exists or [`VolunteerDirectoryError::DuplicateEmail`] when the
    /// e-mail address is already registered.
    async fn register(&self, volunteer: &Volunteer) -> VolunteerDirectoryResult<()>;

    /// Finds a volunteer by identifier.
    ///
    /// Returns `None` when the volunteer does not exist.
    async fn find_by_id(&self, id: VolunteerId) -> VolunteerDirectoryResult<Option<Volunteer>>;

    /// Returns whether a volunteer with the given identifier exists.
    async fn exists(&self, id: VolunteerId) -> VolunteerDirectoryResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Errors returned by volunteer directory implementations.
#[derive(Debug, Clone, Error)]
pub enum VolunteerDirectoryError {
    /// A volunteer with the same identifier already exists.
    #[error("duplicate volunteer identifier: {0}")]
    DuplicateVolunteer(VolunteerId),

    /// A volunteer with the same e-mail address already exists.
    #[error("duplicate volunteer e-mail: {0}")]
    DuplicateEmail(VolunteerEmail),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted volunteer data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl VolunteerDirectoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
