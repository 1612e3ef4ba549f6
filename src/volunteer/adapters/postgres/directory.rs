//! `PostgreSQL` directory implementation for volunteers.

use super::{
    models::{NewVolunteerRow, VolunteerRow},
    schema::volunteers,
};
use crate::volunteer::{
    domain::{PersistedVolunteerData, Volunteer, VolunteerEmail, VolunteerId},
    ports::{VolunteerDirectory, VolunteerDirectoryError, VolunteerDirectoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by volunteer adapters.
pub type VolunteerPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed volunteer directory.
#[derive(Debug, Clone)]
pub struct PostgresVolunteerDirectory {
    pool: VolunteerPgPool,
}

impl PostgresVolunteerDirectory {
    /// Creates a new directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: VolunteerPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> VolunteerDirectoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> VolunteerDirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(VolunteerDirectoryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(VolunteerDirectoryError::persistence)?
    }
}

#[async_trait]
impl VolunteerDirectory for PostgresVolunteerDirectory {
    async fn register(&self, volunteer: &Volunteer) -> VolunteerDirectoryResult<()> {
        let volunteer_id = volunteer.id();
        let email = volunteer.email().clone();
        let new_row = NewVolunteerRow {
            id: volunteer_id.into_inner(),
            name: volunteer.name().to_owned(),
            email: email.as_str().to_owned(),
            created_at: volunteer.created_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(volunteers::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_email_unique_violation(info.as_ref()) =>
                    {
                        VolunteerDirectoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        VolunteerDirectoryError::DuplicateVolunteer(volunteer_id)
                    }
                    _ => VolunteerDirectoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: VolunteerId) -> VolunteerDirectoryResult<Option<Volunteer>> {
        self.run_blocking(move |connection| {
            let row = volunteers::table
                .filter(volunteers::id.eq(id.into_inner()))
                .select(VolunteerRow::as_select())
                .first::<VolunteerRow>(connection)
                .optional()
                .map_err(VolunteerDirectoryError::persistence)?;
            row.map(row_to_volunteer).transpose()
        })
        .await
    }

    async fn exists(&self, id: VolunteerId) -> VolunteerDirectoryResult<bool> {
        self.run_blocking(move |connection| {
            diesel::select(diesel::dsl::exists(
                volunteers::table.filter(volunteers::id.eq(id.into_inner())),
            ))
            .get_result::<bool>(connection)
            .map_err(VolunteerDirectoryError::persistence)
        })
        .await
    }
}

fn row_to_volunteer(row: VolunteerRow) -> VolunteerDirectoryResult<Volunteer> {
    let VolunteerRow {
        id,
        name,
        email,
        created_at,
    } = row;

    let parsed_email =
        VolunteerEmail::new(email).map_err(VolunteerDirectoryError::invalid_persisted_data)?;

    Ok(Volunteer::from_persisted(PersistedVolunteerData {
        id: VolunteerId::from_uuid(id),
        name,
        email: parsed_email,
        created_at,
    }))
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_volunteers_email_unique")
}
