//! `PostgreSQL` adapters for volunteer lookup.

mod directory;
mod models;
mod schema;

pub use directory::{PostgresVolunteerDirectory, VolunteerPgPool};
