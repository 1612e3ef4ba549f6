//! Error types for volunteer domain validation.

use thiserror::Error;

/// Errors returned while constructing volunteer values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VolunteerDomainError {
    /// The display name is empty after trimming.
    #[error("volunteer name must not be empty")]
    EmptyName,

    /// The display name is longer than the directory stores.
    #[error("volunteer name holds at most {max} characters, got {length}")]
    NameTooLong {
        /// Length supplied, in characters.
        length: usize,
        /// Maximum length, in characters.
        max: usize,
    },

    /// The e-mail address is longer than the directory stores.
    #[error("volunteer e-mail holds at most {max} characters, got {length}")]
    EmailTooLong {
        /// Length supplied, in characters.
        length: usize,
        /// Maximum length, in characters.
        max: usize,
    },

    /// The e-mail address is not of the form `local@domain`.
    #[error("invalid volunteer e-mail address '{0}'")]
    InvalidEmail(String),
}
