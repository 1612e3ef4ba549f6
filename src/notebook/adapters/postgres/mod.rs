//! `PostgreSQL` adapters for notebook persistence.

mod models;
mod repository;
mod schema;

pub use repository::{NotebookPgPool, PostgresNotebookRepository};
