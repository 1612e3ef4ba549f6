//! Notebook aggregate root and its reservation/evaluation lifecycle.

use super::{Evaluation, NotebookContent, NotebookDomainError, NotebookId, ParseNotebookStateError};
use crate::volunteer::domain::VolunteerId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notebook lifecycle state.
///
/// The state is derived from the reservation and evaluation fields and is
/// never stored on its own. Transitions are linear:
/// `Available -> Reserved -> Evaluated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotebookState {
    /// Neither reserved nor evaluated.
    Available,
    /// Claimed by a volunteer and awaiting evaluation.
    Reserved,
    /// Evaluated; terminal.
    Evaluated,
}

impl NotebookState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Evaluated => "evaluated",
        }
    }

    /// Returns `true` for states with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Evaluated)
    }
}

impl fmt::Display for NotebookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NotebookState {
    type Error = ParseNotebookStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "evaluated" => Ok(Self::Evaluated),
            _ => Err(ParseNotebookStateError(value.to_owned())),
        }
    }
}

/// A volunteer's exclusive claim on a notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Reservation {
    volunteer_id: VolunteerId,
    reserved_at: DateTime<Utc>,
}

/// An evaluation together with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RecordedEvaluation {
    evaluation: Evaluation,
    evaluated_at: DateTime<Utc>,
}

/// Notebook aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    id: NotebookId,
    content: NotebookContent,
    reservation: Option<Reservation>,
    evaluation: Option<RecordedEvaluation>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted notebook.
///
/// Lifecycle columns are kept flat and nullable here, matching the storage
/// row; [`Notebook::from_persisted`] checks they agree with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotebookData {
    /// Persisted notebook identifier.
    pub id: NotebookId,
    /// Persisted content.
    pub content: NotebookContent,
    /// Reserving volunteer, if any.
    pub reserved_by: Option<VolunteerId>,
    /// Reservation timestamp, if any.
    pub reserved_at: Option<DateTime<Utc>>,
    /// Evaluation fields, if evaluated.
    pub evaluation: Option<Evaluation>,
    /// Evaluation timestamp, if evaluated.
    pub evaluated_at: Option<DateTime<Utc>>,
    /// Import timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notebook {
    /// Creates a newly imported, available notebook.
    #[must_use]
    pub fn import(content: NotebookContent, clock: &impl Clock) -> Self {
        Self {
            id: NotebookId::new(),
            content,
            reservation: None,
            evaluation: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a notebook from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::InconsistentLifecycle`] when the
    /// reservation columns are only half set, when an evaluation exists
    /// without a reservation, or when the evaluation fields and timestamp
    /// disagree.
    pub fn from_persisted(data: PersistedNotebookData) -> Result<Self, NotebookDomainError> {
        let notebook_id = data.id;
        let inconsistent = |reason: &'static str| NotebookDomainError::InconsistentLifecycle {
            notebook_id,
            reason,
        };

        let reservation = match (data.reserved_by, data.reserved_at) {
            (Some(volunteer_id), Some(reserved_at)) => Some(Reservation {
                volunteer_id,
                reserved_at,
            }),
            (None, None) => None,
            _ => return Err(inconsistent("reserved_by and reserved_at must be set together")),
        };

        let evaluation = match (data.evaluation, data.evaluated_at) {
            (Some(evaluation), Some(evaluated_at)) => Some(RecordedEvaluation {
                evaluation,
                evaluated_at,
            }),
            (None, None) => None,
            _ => {
                return Err(inconsistent(
                    "evaluation fields and evaluated_at must be set together",
                ));
            }
        };

        if evaluation.is_some() && reservation.is_none() {
            return Err(inconsistent("evaluated notebook has no reservation"));
        }

        Ok(Self {
            id: notebook_id,
            content: data.content,
            reservation,
            evaluation,
            created_at: data.created_at,
        })
    }

    /// Returns the notebook identifier.
    #[must_use]
    pub const fn id(&self) -> NotebookId {
        self.id
    }

    /// Returns the imported content.
    #[must_use]
    pub const fn content(&self) -> &NotebookContent {
        &self.content
    }

    /// Returns the reserving volunteer, if any.
    #[must_use]
    pub fn reserved_by(&self) -> Option<VolunteerId> {
        self.reservation.map(|reservation| reservation.volunteer_id)
    }

    /// Returns the reservation timestamp, if any.
    #[must_use]
    pub fn reserved_at(&self) -> Option<DateTime<Utc>> {
        self.reservation.map(|reservation| reservation.reserved_at)
    }

    /// Returns the evaluation fields, if evaluated.
    #[must_use]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref().map(|recorded| &recorded.evaluation)
    }

    /// Returns the evaluation timestamp, if evaluated.
    #[must_use]
    pub fn evaluated_at(&self) -> Option<DateTime<Utc>> {
        self.evaluation.as_ref().map(|recorded| recorded.evaluated_at)
    }

    /// Returns the import timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the lifecycle state derived from the lifecycle fields.
    #[must_use]
    pub const fn state(&self) -> NotebookState {
        match (&self.reservation, &self.evaluation) {
            (_, Some(_)) => NotebookState::Evaluated,
            (Some(_), None) => NotebookState::Reserved,
            (None, None) => NotebookState::Available,
        }
    }

    /// Returns `true` when the notebook may be shown to the volunteer:
    /// either available, or reserved by that volunteer and not evaluated.
    #[must_use]
    pub fn is_accessible_to(&self, volunteer_id: VolunteerId) -> bool {
        match self.state() {
            NotebookState::Available => true,
            NotebookState::Reserved => self.reserved_by() == Some(volunteer_id),
            NotebookState::Evaluated => false,
        }
    }

    /// Claims the notebook for a volunteer.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::NotAvailable`] when the notebook is
    /// already reserved or evaluated. The notebook is left untouched.
    pub fn claim(
        &mut self,
        volunteer_id: VolunteerId,
        reserved_at: DateTime<Utc>,
    ) -> Result<(), NotebookDomainError> {
        let state = self.state();
        if state != NotebookState::Available {
            return Err(NotebookDomainError::NotAvailable {
                notebook_id: self.id,
                state,
            });
        }
        self.reservation = Some(Reservation {
            volunteer_id,
            reserved_at,
        });
        Ok(())
    }

    /// Records the evaluation submitted by the reserving volunteer.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::AlreadyEvaluated`] when an evaluation
    /// exists, or [`NotebookDomainError::NotReservedBy`] when the evaluator
    /// does not hold the reservation. The notebook is left untouched.
    pub fn record_evaluation(
        &mut self,
        evaluator: VolunteerId,
        evaluation: Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<(), NotebookDomainError> {
        if self.evaluation.is_some() {
            return Err(NotebookDomainError::AlreadyEvaluated(self.id));
        }
        if self.reserved_by() != Some(evaluator) {
            return Err(NotebookDomainError::NotReservedBy {
                notebook_id: self.id,
                volunteer_id: evaluator,
            });
        }
        self.evaluation = Some(RecordedEvaluation {
            evaluation,
            evaluated_at,
        });
        Ok(())
    }
}
