//! Notebook reservation and evaluation.
//!
//! Volunteers claim scanned student notebooks and later submit a grade. At
//! most one claim and at most one evaluation succeed per notebook, enforced
//! by conditional updates in the repository rather than by in-process locks.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
