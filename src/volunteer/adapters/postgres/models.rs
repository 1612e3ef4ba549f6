//! Diesel row models for volunteer persistence.

use super::schema::volunteers;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for volunteer records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = volunteers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VolunteerRow {
    /// Volunteer identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for volunteer records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = volunteers)]
pub struct NewVolunteerRow {
    /// Volunteer identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}
