//! Repository port for notebook storage and lifecycle transitions.
//!
//! Every transition is a single conditional update: the precondition is part
//! of the write's match predicate, and the number of rows it changed is the
//! success signal. Implementations must not split a transition into a read
//! followed by a write.

use crate::notebook::domain::{Evaluation, Notebook, NotebookId};
use crate::volunteer::domain::{Volunteer, VolunteerId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for notebook repository operations.
pub type NotebookRepositoryResult<T> = Result<T, NotebookRepositoryError>;

/// Outcome of a conditional lifecycle update.
///
/// `Rejected` is an expected result of racing, not a fault: the predicate
/// matched no row and nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum TransitionOutcome {
    /// Exactly one row matched; carries the refreshed notebook.
    Applied(Box<Notebook>),
    /// No row matched the predicate.
    Rejected,
}

impl TransitionOutcome {
    /// Wraps a refreshed notebook as an applied outcome.
    pub fn applied(notebook: Notebook) -> Self {
        Self::Applied(Box::new(notebook))
    }

    /// Returns `true` when the update changed a row.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Returns the refreshed notebook when applied.
    #[must_use]
    pub fn into_notebook(self) -> Option<Notebook> {
        match self {
            Self::Applied(notebook) => Some(*notebook),
            Self::Rejected => None,
        }
    }
}

/// Notebook joined with the volunteer holding its reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookWithReserver {
    /// The notebook.
    pub notebook: Notebook,
    /// The reserving volunteer; `None` while the notebook is available.
    pub reserver: Option<Volunteer>,
}

/// Notebook persistence and lifecycle contract.
#[async_trait]
pub trait NotebookRepository: Send + Sync {
    /// Stores a newly imported notebook.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookRepositoryError::DuplicateNotebook`] when the
    /// notebook ID already exists.
    async fn import(&self, notebook: &Notebook) -> NotebookRepositoryResult<()>;

    /// Finds a notebook by identifier.
    ///
    /// Returns `None` when the notebook does not exist. This is also the
    /// reconciliation read after an ambiguous transition attempt.
    async fn find_by_id(&self, id: NotebookId) -> NotebookRepositoryResult<Option<Notebook>>;

    /// Finds a notebook together with its reserving volunteer.
    async fn find_with_reserver(
        &self,
        id: NotebookId,
    ) -> NotebookRepositoryResult<Option<NotebookWithReserver>>;

    /// Reserves the notebook for the volunteer when it is neither reserved
    /// nor evaluated.
    ///
    /// Returns [`TransitionOutcome::Rejected`] when the notebook is missing,
    /// already reserved, or already evaluated.
    async fn claim_for_volunteer(
        &self,
        notebook_id: NotebookId,
        volunteer_id: VolunteerId,
        reserved_at: DateTime<Utc>,
    ) -> NotebookRepositoryResult<TransitionOutcome>;

    /// Records the evaluation when the notebook is unevaluated and reserved
    /// by `evaluator`.
    ///
    /// Returns [`TransitionOutcome::Rejected`] when the notebook is missing,
    /// already evaluated, or reserved by someone else (or nobody).
    async fn evaluate(
        &self,
        notebook_id: NotebookId,
        evaluator: VolunteerId,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> NotebookRepositoryResult<TransitionOutcome>;

    /// Returns notebooks that are neither reserved nor evaluated, in storage
    /// order.
    async fn list_available(&self) -> NotebookRepositoryResult<Vec<Notebook>>;

    /// Returns unevaluated notebooks reserved by the volunteer.
    async fn list_reserved_by(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotebookRepositoryResult<Vec<Notebook>>;

    /// Counts notebooks reserved and evaluated by the volunteer.
    async fn count_evaluated_by(&self, volunteer_id: VolunteerId)
    -> NotebookRepositoryResult<u64>;
}

/// Errors returned by notebook repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NotebookRepositoryError {
    /// A notebook with the same identifier already exists.
    #[error("duplicate notebook identifier: {0}")]
    DuplicateNotebook(NotebookId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted notebook data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotebookRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
