//! In-memory volunteer directory for tests and single-process use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::volunteer::{
    domain::{Volunteer, VolunteerEmail, VolunteerId},
    ports::{VolunteerDirectory, VolunteerDirectoryError, VolunteerDirectoryResult},
};

/// Thread-safe in-memory volunteer directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVolunteerDirectory {
    state: Arc<RwLock<InMemoryVolunteerState>>,
}

#[derive(Debug, Default)]
struct InMemoryVolunteerState {
    volunteers: HashMap<VolunteerId, Volunteer>,
    email_index: HashMap<VolunteerEmail, VolunteerId>,
}

impl InMemoryVolunteerDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> VolunteerDirectoryError {
    VolunteerDirectoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl VolunteerDirectory for InMemoryVolunteerDirectory {
    async fn register(&self, volunteer: &Volunteer) -> VolunteerDirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.volunteers.contains_key(&volunteer.id()) {
            return Err(VolunteerDirectoryError::DuplicateVolunteer(volunteer.id()));
        }
        if state.email_index.contains_key(volunteer.email()) {
            return Err(VolunteerDirectoryError::DuplicateEmail(
                volunteer.email().clone(),
            ));
        }

        state
            .email_index
            .insert(volunteer.email().clone(), volunteer.id());
        state.volunteers.insert(volunteer.id(), volunteer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: VolunteerId) -> VolunteerDirectoryResult<Option<Volunteer>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.volunteers.get(&id).cloned())
    }
}
