//! Identifier and validated scalar types for the volunteer domain.

use super::VolunteerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a registered volunteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolunteerId(Uuid);

impl VolunteerId {
    /// Creates a new random volunteer identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a volunteer identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for VolunteerId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for VolunteerId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for VolunteerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum length, in characters, of a volunteer e-mail address.
pub const MAX_EMAIL_LEN: usize = 255;

/// Normalized volunteer e-mail address.
///
/// Stored lowercase so that uniqueness checks are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolunteerEmail(String);

impl VolunteerEmail {
    /// Creates a validated e-mail address.
    ///
    /// # Errors
    ///
    /// Returns [`VolunteerDomainError::InvalidEmail`] when the value does not
    /// contain exactly one `@` separating non-empty local and domain parts,
    /// or contains whitespace, and [`VolunteerDomainError::EmailTooLong`]
    /// when it exceeds [`MAX_EMAIL_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, VolunteerDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        let mut parts = normalized.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        let is_valid = !local.is_empty()
            && !domain.is_empty()
            && parts.next().is_none()
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(VolunteerDomainError::InvalidEmail(raw));
        }
        let length = normalized.chars().count();
        if length > MAX_EMAIL_LEN {
            return Err(VolunteerDomainError::EmailTooLong {
                length,
                max: MAX_EMAIL_LEN,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolunteerEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
