//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use cadernos::config::StoreConfig;
use cadernos::notebook::adapters::postgres::PostgresNotebookRepository;
use cadernos::volunteer::{
    adapters::postgres::PostgresVolunteerDirectory,
    domain::{Volunteer, VolunteerEmail},
    ports::VolunteerDirectory,
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use rstest::fixture;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// SQL creating the volunteers table.
pub const CREATE_VOLUNTEERS_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_volunteers/up.sql");

/// SQL creating the notebooks table and its lifecycle constraints.
pub const CREATE_NOTEBOOKS_SQL: &str =
    include_str!("../../migrations/2026-10-19-000001_create_notebooks/up.sql");

/// Template database name for pre-migrated schema.
pub const TEMPLATE_DB: &str = "cadernos_test_template";

/// Builds a multi-threaded runtime so racing tasks really run in parallel.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: PostgresCluster) -> Result<(), BoxError> {
    let connection = cluster.connection();
    cluster.ensure_template_exists(TEMPLATE_DB, move |db_name| {
        apply_migrations(&connection.database_url(db_name))
    })
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    for sql in [CREATE_VOLUNTEERS_SQL, CREATE_NOTEBOOKS_SQL] {
        conn.batch_execute(sql)
            .map_err(|err| Box::new(err) as BoxError)?;
    }
    Ok(())
}

/// Drops the per-test database when the test finishes.
pub struct CleanupGuard {
    cluster: PostgresCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(&self.db_name));
    }
}

/// A migrated scratch database with both adapters connected to it.
pub struct StoreContext {
    pub rt: Runtime,
    pub notebooks: PostgresNotebookRepository,
    pub volunteers: PostgresVolunteerDirectory,
    pub cluster: PostgresCluster,
    pub db_name: String,
    _guard: CleanupGuard,
}

impl StoreContext {
    fn prepare(cluster: PostgresCluster) -> Result<Self, BoxError> {
        ensure_template(cluster)?;
        let db_name = format!("test_{}", Uuid::new_v4().simple());
        cluster.create_database_from_template(&db_name, TEMPLATE_DB)?;
        let guard = CleanupGuard {
            cluster,
            db_name: db_name.clone(),
        };

        let pool = StoreConfig::new(cluster.connection().database_url(&db_name))
            .with_max_pool_size(8)
            .build_pool()
            .map_err(|err| Box::new(err) as BoxError)?;
        Ok(Self {
            rt: test_runtime()?,
            notebooks: PostgresNotebookRepository::new(pool.clone()),
            volunteers: PostgresVolunteerDirectory::new(pool),
            cluster,
            db_name,
            _guard: guard,
        })
    }

    /// Registers a volunteer named `name` and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the volunteer is invalid or cannot be stored.
    pub fn register_volunteer(&self, name: &str) -> Result<Volunteer, BoxError> {
        let email = VolunteerEmail::new(format!("{}@example.org", name.to_lowercase()))?;
        let volunteer = Volunteer::new(name, email, &DefaultClock)?;
        self.rt.block_on(self.volunteers.register(&volunteer))?;
        Ok(volunteer)
    }

    /// Runs raw SQL against the scratch database, bypassing the adapters.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or statement fails.
    pub fn execute_raw(&self, sql: &str) -> Result<(), BoxError> {
        let url = self.cluster.connection().database_url(&self.db_name);
        let mut conn = PgConnection::establish(&url).map_err(|err| Box::new(err) as BoxError)?;
        conn.batch_execute(sql)
            .map_err(|err| Box::new(err) as BoxError)
    }
}

/// Provides a migrated scratch store on the shared cluster.
///
/// # Errors
///
/// Returns an error if the cluster did not start or the database cannot be
/// prepared.
#[fixture]
pub fn store(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<StoreContext, BoxError> {
    StoreContext::prepare(postgres_cluster?)
}
