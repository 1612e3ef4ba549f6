//! Volunteer entity.

use super::{VolunteerDomainError, VolunteerEmail, VolunteerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of a volunteer's display name.
pub const MAX_VOLUNTEER_NAME_LEN: usize = 255;

/// A registered volunteer who may reserve and evaluate notebooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    id: VolunteerId,
    name: String,
    email: VolunteerEmail,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted volunteer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedVolunteerData {
    /// Persisted identifier.
    pub id: VolunteerId,
    /// Persisted display name.
    pub name: String,
    /// Persisted e-mail address.
    pub email: VolunteerEmail,
    /// Persisted registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl Volunteer {
    /// Creates a new volunteer with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`VolunteerDomainError::EmptyName`] when the name is blank and
    /// [`VolunteerDomainError::NameTooLong`] when it exceeds
    /// [`MAX_VOLUNTEER_NAME_LEN`] characters.
    pub fn new(
        name: impl Into<String>,
        email: VolunteerEmail,
        clock: &impl Clock,
    ) -> Result<Self, VolunteerDomainError> {
        let raw_name = name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(VolunteerDomainError::EmptyName);
        }
        let length = trimmed.chars().count();
        if length > MAX_VOLUNTEER_NAME_LEN {
            return Err(VolunteerDomainError::NameTooLong {
                length,
                max: MAX_VOLUNTEER_NAME_LEN,
            });
        }

        Ok(Self {
            id: VolunteerId::new(),
            name: trimmed.to_owned(),
            email,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a volunteer from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedVolunteerData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
            created_at: data.created_at,
        }
    }

    /// Returns the volunteer identifier.
    #[must_use]
    pub const fn id(&self) -> VolunteerId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the e-mail address.
    #[must_use]
    pub const fn email(&self) -> &VolunteerEmail {
        &self.email
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
