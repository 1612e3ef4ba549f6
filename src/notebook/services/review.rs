//! Service layer for notebook reservation and evaluation.
//!
//! Existence checks run before the race-sensitive step and are advisory
//! only; the repository's conditional update decides the outcome.

use super::{EvaluateNotebookRequest, ImportNotebookRequest};
use crate::notebook::{
    domain::{Notebook, NotebookDomainError, NotebookId, NotebookState},
    ports::{NotebookRepository, NotebookRepositoryError, NotebookWithReserver, TransitionOutcome},
};
use crate::volunteer::{
    domain::VolunteerId,
    ports::{VolunteerDirectory, VolunteerDirectoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for notebook review operations.
#[derive(Debug, Error)]
pub enum NotebookReviewError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] NotebookDomainError),

    /// Notebook repository operation failed.
    #[error(transparent)]
    Repository(#[from] NotebookRepositoryError),

    /// Volunteer directory operation failed.
    #[error(transparent)]
    Volunteers(#[from] VolunteerDirectoryError),

    /// No volunteer exists with the given identifier.
    #[error("volunteer {0} not found")]
    VolunteerNotFound(VolunteerId),

    /// No notebook exists with the given identifier.
    #[error("notebook {0} not found")]
    NotebookNotFound(NotebookId),

    /// The notebook was already reserved or evaluated when the claim ran.
    #[error("notebook {0} is already reserved or evaluated")]
    AlreadyReservedOrEvaluated(NotebookId),

    /// The notebook was already evaluated when the evaluation ran.
    #[error("notebook {0} has already been evaluated")]
    AlreadyEvaluated(NotebookId),

    /// The evaluator does not hold the notebook's reservation.
    #[error("notebook {notebook_id} is not reserved by volunteer {volunteer_id}")]
    NotReservedByVolunteer {
        /// Notebook identifier.
        notebook_id: NotebookId,
        /// Volunteer who attempted the evaluation.
        volunteer_id: VolunteerId,
    },
}

impl NotebookReviewError {
    /// Returns `true` when the caller referenced a missing volunteer or
    /// notebook.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::VolunteerNotFound(_) | Self::NotebookNotFound(_))
    }

    /// Returns `true` when the request lost a race or targeted a notebook
    /// whose state had already moved on. Never retried automatically.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyReservedOrEvaluated(_) | Self::AlreadyEvaluated(_)
        )
    }

    /// Returns `true` when a volunteer tried to evaluate a notebook reserved
    /// by someone else, or not reserved at all.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::NotReservedByVolunteer { .. })
    }
}

/// Result type for notebook review service operations.
pub type NotebookReviewResult<T> = Result<T, NotebookReviewError>;

/// Notebook reservation and evaluation orchestration service.
#[derive(Clone)]
pub struct NotebookReviewService<R, V, C>
where
    R: NotebookRepository,
    V: VolunteerDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    volunteers: Arc<V>,
    clock: Arc<C>,
}

impl<R, V, C> NotebookReviewService<R, V, C>
where
    R: NotebookRepository,
    V: VolunteerDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new notebook review service.
    #[must_use]
    pub const fn new(repository: Arc<R>, volunteers: Arc<V>, clock: Arc<C>) -> Self {
        Self {
            repository,
            volunteers,
            clock,
        }
    }

    async fn ensure_notebook_exists(&self, notebook_id: NotebookId) -> NotebookReviewResult<()> {
        if self.repository.find_by_id(notebook_id).await?.is_none() {
            return Err(NotebookReviewError::NotebookNotFound(notebook_id));
        }
        Ok(())
    }

    /// Imports a scanned notebook in the available state.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookReviewError::Domain`] when the content is invalid
    /// or [`NotebookReviewError::Repository`] when persistence fails.
    pub async fn import_notebook(
        &self,
        request: ImportNotebookRequest,
    ) -> NotebookReviewResult<Notebook> {
        let content = request.into_content()?;
        let notebook = Notebook::import(content, &*self.clock);
        self.repository.import(&notebook).await?;
        debug!(notebook_id = %notebook.id(), "notebook imported");
        Ok(notebook)
    }

    /// Reserves a notebook for a volunteer.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookReviewError::VolunteerNotFound`] or
    /// [`NotebookReviewError::NotebookNotFound`] when either identifier is
    /// unknown, [`NotebookReviewError::AlreadyReservedOrEvaluated`] when the
    /// conditional claim matched nothing, and repository or directory
    /// errors unchanged.
    pub async fn reserve(
        &self,
        volunteer_id: VolunteerId,
        notebook_id: NotebookId,
    ) -> NotebookReviewResult<Notebook> {
        debug!(%volunteer_id, %notebook_id, "reservation requested");
        if !self.volunteers.exists(volunteer_id).await? {
            return Err(NotebookReviewError::VolunteerNotFound(volunteer_id));
        }
        self.ensure_notebook_exists(notebook_id).await?;

        let outcome = self
            .repository
            .claim_for_volunteer(notebook_id, volunteer_id, self.clock.utc())
            .await?;
        match outcome {
            TransitionOutcome::Applied(notebook) => {
                info!(%volunteer_id, %notebook_id, "notebook reserved");
                Ok(*notebook)
            }
            TransitionOutcome::Rejected => {
                warn!(%volunteer_id, %notebook_id, "reservation rejected");
                Err(NotebookReviewError::AlreadyReservedOrEvaluated(notebook_id))
            }
        }
    }

    /// Records a volunteer's evaluation of a notebook they reserved.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookReviewError::Domain`] for invalid evaluation fields,
    /// [`NotebookReviewError::NotebookNotFound`] for an unknown notebook,
    /// [`NotebookReviewError::AlreadyEvaluated`] when the notebook was
    /// already evaluated, [`NotebookReviewError::NotReservedByVolunteer`]
    /// when the evaluator does not hold the reservation, and repository
    /// errors unchanged.
    pub async fn evaluate(
        &self,
        request: EvaluateNotebookRequest,
    ) -> NotebookReviewResult<Notebook> {
        let volunteer_id = request.volunteer_id();
        let notebook_id = request.notebook_id();
        debug!(%volunteer_id, %notebook_id, "evaluation submitted");
        let evaluation = request.to_evaluation()?;
        self.ensure_notebook_exists(notebook_id).await?;

        let outcome = self
            .repository
            .evaluate(notebook_id, volunteer_id, &evaluation, self.clock.utc())
            .await?;
        match outcome {
            TransitionOutcome::Applied(notebook) => {
                info!(%volunteer_id, %notebook_id, "notebook evaluated");
                Ok(*notebook)
            }
            TransitionOutcome::Rejected => {
                warn!(%volunteer_id, %notebook_id, "evaluation rejected");
                Err(self.explain_rejected_evaluation(notebook_id, volunteer_id).await?)
            }
        }
    }

    /// Maps a rejected evaluation onto the most specific error.
    ///
    /// The read happens after the write was refused and only shapes the
    /// error; it never decides whether the evaluation succeeds.
    async fn explain_rejected_evaluation(
        &self,
        notebook_id: NotebookId,
        volunteer_id: VolunteerId,
    ) -> NotebookReviewResult<NotebookReviewError> {
        let current = self.repository.find_by_id(notebook_id).await?;
        Ok(match current.map(|notebook| notebook.state()) {
            None => NotebookReviewError::NotebookNotFound(notebook_id),
            Some(NotebookState::Evaluated) => NotebookReviewError::AlreadyEvaluated(notebook_id),
            Some(NotebookState::Available | NotebookState::Reserved) => {
                NotebookReviewError::NotReservedByVolunteer {
                    notebook_id,
                    volunteer_id,
                }
            }
        })
    }

    /// Lists notebooks the volunteer may work on: their own open
    /// reservations first, then every available notebook.
    ///
    /// # Errors
    ///
    /// Returns repository errors unchanged.
    pub async fn list_accessible(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotebookReviewResult<Vec<Notebook>> {
        let mut accessible = self.repository.list_reserved_by(volunteer_id).await?;
        let available = self.repository.list_available().await?;
        accessible.extend(available);
        Ok(accessible)
    }

    /// Counts notebooks the volunteer has evaluated.
    ///
    /// # Errors
    ///
    /// Returns repository errors unchanged.
    pub async fn count_evaluated_by(&self, volunteer_id: VolunteerId) -> NotebookReviewResult<u64> {
        Ok(self.repository.count_evaluated_by(volunteer_id).await?)
    }

    /// Reads the current notebook state.
    ///
    /// Callers whose reservation or evaluation attempt timed out use this to
    /// learn whether the write landed instead of resubmitting blindly.
    ///
    /// # Errors
    ///
    /// Returns repository errors unchanged.
    pub async fn find_notebook(
        &self,
        notebook_id: NotebookId,
    ) -> NotebookReviewResult<Option<Notebook>> {
        Ok(self.repository.find_by_id(notebook_id).await?)
    }

    /// Reads a notebook together with the volunteer holding its reservation.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookReviewError::NotebookNotFound`] for an unknown
    /// notebook and repository errors unchanged.
    pub async fn find_with_reserver(
        &self,
        notebook_id: NotebookId,
    ) -> NotebookReviewResult<NotebookWithReserver> {
        self.repository
            .find_with_reserver(notebook_id)
            .await?
            .ok_or(NotebookReviewError::NotebookNotFound(notebook_id))
    }
}
