//! Port contracts for notebook reservation and evaluation.
//!
//! Ports define infrastructure-agnostic interfaces used by notebook services.

pub mod repository;

pub use repository::{
    NotebookRepository, NotebookRepositoryError, NotebookRepositoryResult, NotebookWithReserver,
    TransitionOutcome,
};
