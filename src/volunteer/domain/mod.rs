//! Domain model for volunteer identities.

mod error;
mod ids;
mod volunteer;

pub use error::VolunteerDomainError;
pub use ids::{MAX_EMAIL_LEN, VolunteerEmail, VolunteerId};
pub use volunteer::{MAX_VOLUNTEER_NAME_LEN, PersistedVolunteerData, Volunteer};
