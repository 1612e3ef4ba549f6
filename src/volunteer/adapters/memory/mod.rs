//! In-memory volunteer adapters.

mod directory;

pub use directory::InMemoryVolunteerDirectory;
