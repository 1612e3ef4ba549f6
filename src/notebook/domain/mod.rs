//! Domain model for notebook reservation and evaluation.
//!
//! A notebook moves through `Available -> Reserved -> Evaluated` exactly
//! once. Content captured at import time is immutable; only the reservation
//! and evaluation fields change.

mod content;
mod error;
mod ids;
mod notebook;

pub use content::{
    Evaluation, MAX_ANSWERS, MAX_NAME_LEN, MAX_REGISTRATION_LEN, MAX_SUBJECTS, NotebookContent,
};
pub use error::{NotebookDomainError, ParseNotebookStateError};
pub use ids::NotebookId;
pub use notebook::{Notebook, NotebookState, PersistedNotebookData};
