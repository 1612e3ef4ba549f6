//! Error types for notebook domain validation and lifecycle transitions.

use super::{NotebookId, NotebookState};
use crate::volunteer::domain::VolunteerId;
use thiserror::Error;

/// Errors returned while constructing notebook values or applying lifecycle
/// transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotebookDomainError {
    /// The student name is empty after trimming.
    #[error("student name must not be empty")]
    EmptyStudentName,

    /// The prison unit is empty after trimming.
    #[error("prison unit must not be empty")]
    EmptyPrisonUnit,

    /// A text field is longer than its stored column allows.
    #[error("{field} holds at most {max} characters, got {length}")]
    TooLong {
        /// Which field overflowed.
        field: &'static str,
        /// Length supplied, in characters.
        length: usize,
        /// Maximum length, in characters.
        max: usize,
    },

    /// More subject labels were supplied than a notebook can hold.
    #[error("notebook holds at most {max} subjects, got {count}")]
    TooManySubjects {
        /// Number of subjects supplied.
        count: usize,
        /// Maximum number of subjects.
        max: usize,
    },

    /// More answer fields were supplied than a notebook can hold.
    #[error("notebook holds at most {max} answers, got {count}")]
    TooManyAnswers {
        /// Number of answers supplied.
        count: usize,
        /// Maximum number of answers.
        max: usize,
    },

    /// The evaluation conclusion is empty after trimming.
    #[error("evaluation conclusion must not be empty")]
    EmptyConclusion,

    /// The notebook cannot be claimed because it is not available.
    #[error("notebook {notebook_id} cannot be reserved (current state: {state})")]
    NotAvailable {
        /// Notebook identifier.
        notebook_id: NotebookId,
        /// Lifecycle state at the time of the attempt.
        state: NotebookState,
    },

    /// The notebook has already been evaluated.
    #[error("notebook {0} has already been evaluated")]
    AlreadyEvaluated(NotebookId),

    /// The evaluator does not hold the reservation for the notebook.
    #[error("notebook {notebook_id} is not reserved by volunteer {volunteer_id}")]
    NotReservedBy {
        /// Notebook identifier.
        notebook_id: NotebookId,
        /// Volunteer who attempted the evaluation.
        volunteer_id: VolunteerId,
    },

    /// Persisted lifecycle columns contradict each other.
    #[error("notebook {notebook_id} has inconsistent lifecycle data: {reason}")]
    InconsistentLifecycle {
        /// Notebook identifier.
        notebook_id: NotebookId,
        /// Which invariant was violated.
        reason: &'static str,
    },
}

/// Error returned while parsing notebook states.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notebook state: {0}")]
pub struct ParseNotebookStateError(pub String);
