//! Port contracts for volunteer lookup.

pub mod directory;

pub use directory::{VolunteerDirectory, VolunteerDirectoryError, VolunteerDirectoryResult};
