//! Cadernos: reservation and evaluation of scanned student notebooks.
//!
//! Volunteers pick notebooks written by incarcerated students, reserve one
//! at a time, and submit an evaluation. Reservation and evaluation are both
//! decided by a single conditional write in storage, so concurrent requests
//! across processes still produce at most one winner per notebook.
//!
//! # Architecture
//!
//! Cadernos follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: In-memory and `PostgreSQL` implementations of ports
//!
//! # Modules
//!
//! - [`notebook`]: Notebook lifecycle, repository contract, review service
//! - [`volunteer`]: Volunteer identity and directory lookup
//! - [`config`]: Environment-driven store configuration

pub mod config;
pub mod notebook;
pub mod volunteer;
