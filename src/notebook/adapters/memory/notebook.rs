//! In-memory notebook repository.
//!
//! Each conditional update holds the write lock for the whole
//! check-and-write, which gives the same at-most-one-winner guarantee as a
//! single-statement `UPDATE ... WHERE` in `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::notebook::{
    domain::{Evaluation, Notebook, NotebookDomainError, NotebookId, NotebookState},
    ports::{
        NotebookRepository, NotebookRepositoryError, NotebookRepositoryResult,
        NotebookWithReserver, TransitionOutcome,
    },
};
use crate::volunteer::{
    adapters::memory::InMemoryVolunteerDirectory, domain::VolunteerId, ports::VolunteerDirectory,
};

/// Thread-safe in-memory notebook repository.
///
/// Reserver lookups go through the linked [`InMemoryVolunteerDirectory`];
/// share one directory between the repository and the service so that
/// reservations always point at known volunteers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotebookRepository {
    state: Arc<RwLock<InMemoryNotebookState>>,
    volunteers: InMemoryVolunteerDirectory,
}

#[derive(Debug, Default)]
struct InMemoryNotebookState {
    notebooks: HashMap<NotebookId, Notebook>,
    import_order: Vec<NotebookId>,
}

impl InMemoryNotebookState {
    fn in_import_order(&self, predicate: impl Fn(&Notebook) -> bool) -> Vec<Notebook> {
        self.import_order
            .iter()
            .filter_map(|id| self.notebooks.get(id))
            .filter(|notebook| predicate(notebook))
            .cloned()
            .collect()
    }
}

impl InMemoryNotebookRepository {
    /// Creates an empty repository with its own empty volunteer directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository that resolves reservers through the given
    /// directory.
    #[must_use]
    pub fn linked_to(volunteers: InMemoryVolunteerDirectory) -> Self {
        Self {
            state: Arc::default(),
            volunteers,
        }
    }

    fn transition<F>(&self, id: NotebookId, apply: F) -> NotebookRepositoryResult<TransitionOutcome>
    where
        F: FnOnce(&mut Notebook) -> Result<(), NotebookDomainError>,
    {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let Some(notebook) = state.notebooks.get_mut(&id) else {
            return Ok(TransitionOutcome::Rejected);
        };
        match apply(notebook) {
            Ok(()) => Ok(TransitionOutcome::applied(notebook.clone())),
            Err(_) => Ok(TransitionOutcome::Rejected),
        }
    }

    fn read_state<T>(
        &self,
        read: impl FnOnce(&InMemoryNotebookState) -> T,
    ) -> NotebookRepositoryResult<T> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(read(&state))
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> NotebookRepositoryError {
    NotebookRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl NotebookRepository for InMemoryNotebookRepository {
    async fn import(&self, notebook: &Notebook) -> NotebookRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.notebooks.contains_key(&notebook.id()) {
            return Err(NotebookRepositoryError::DuplicateNotebook(notebook.id()));
        }
        state.import_order.push(notebook.id());
        state.notebooks.insert(notebook.id(), notebook.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: NotebookId) -> NotebookRepositoryResult<Option<Notebook>> {
        self.read_state(|state| state.notebooks.get(&id).cloned())
    }

    async fn find_with_reserver(
        &self,
        id: NotebookId,
    ) -> NotebookRepositoryResult<Option<NotebookWithReserver>> {
        let Some(notebook) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let Some(volunteer_id) = notebook.reserved_by() else {
            return Ok(Some(NotebookWithReserver {
                notebook,
                reserver: None,
            }));
        };

        let reserver = self
            .volunteers
            .find_by_id(volunteer_id)
            .await
            .map_err(NotebookRepositoryError::persistence)?
            .ok_or_else(|| {
                NotebookRepositoryError::invalid_persisted_data(std::io::Error::other(format!(
                    "notebook {id} is reserved by unknown volunteer {volunteer_id}"
                )))
            })?;
        Ok(Some(NotebookWithReserver {
            notebook,
            reserver: Some(reserver),
        }))
    }

    async fn claim_for_volunteer(
        &self,
        notebook_id: NotebookId,
        volunteer_id: VolunteerId,
        reserved_at: DateTime<Utc>,
    ) -> NotebookRepositoryResult<TransitionOutcome> {
        self.transition(notebook_id, |notebook| {
            notebook.claim(volunteer_id, reserved_at)
        })
    }

    async fn evaluate(
        &self,
        notebook_id: NotebookId,
        evaluator: VolunteerId,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> NotebookRepositoryResult<TransitionOutcome> {
        let fields = evaluation.clone();
        self.transition(notebook_id, |notebook| {
            notebook.record_evaluation(evaluator, fields, evaluated_at)
        })
    }

    async fn list_available(&self) -> NotebookRepositoryResult<Vec<Notebook>> {
        self.read_state(|state| {
            state.in_import_order(|notebook| notebook.state() == NotebookState::Available)
        })
    }

    async fn list_reserved_by(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotebookRepositoryResult<Vec<Notebook>> {
        self.read_state(|state| {
            state.in_import_order(|notebook| {
                notebook.state() == NotebookState::Reserved
                    && notebook.reserved_by() == Some(volunteer_id)
            })
        })
    }

    async fn count_evaluated_by(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotebookRepositoryResult<u64> {
        let count = self.read_state(|state| {
            state
                .notebooks
                .values()
                .filter(|notebook| {
                    notebook.state() == NotebookState::Evaluated
                        && notebook.reserved_by() == Some(volunteer_id)
                })
                .count()
        })?;
        u64::try_from(count).map_err(NotebookRepositoryError::persistence)
    }
}
