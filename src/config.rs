//! Store configuration and connection pool construction.
//!
//! Settings are read from the process environment:
//!
//! | Variable                         | Required | Default |
//! |----------------------------------|----------|---------|
//! | `DATABASE_URL`                   | yes      |         |
//! | `CADERNOS_POOL_SIZE`             | no       | `10`    |
//! | `CADERNOS_CONNECT_TIMEOUT_SECS`  | no       | `30`    |

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable holding the maximum pool size.
pub const POOL_SIZE_ENV: &str = "CADERNOS_POOL_SIZE";

/// Environment variable holding the connection checkout timeout in seconds.
pub const CONNECT_TIMEOUT_ENV: &str = "CADERNOS_CONNECT_TIMEOUT_SECS";

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared `PostgreSQL` pool used by the notebook and volunteer adapters.
pub type CadernosPgPool = Pool<ConnectionManager<PgConnection>>;

/// Errors raised while loading configuration or building the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("environment variable {0} must be set")]
    MissingVariable(&'static str),

    /// A variable is set to a value that cannot be used.
    #[error("environment variable {variable} has invalid value '{value}': {reason}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// Connection settings for the notebook store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
    max_pool_size: u32,
    connection_timeout: Duration,
}

impl StoreConfig {
    /// Creates a configuration with default pool settings.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the maximum number of pooled connections.
    #[must_use]
    pub const fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Sets the connection checkout timeout.
    #[must_use]
    pub const fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] when `DATABASE_URL` is unset
    /// and [`ConfigError::InvalidValue`] when an optional variable cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`StoreConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVariable(DATABASE_URL_ENV))?;

        let mut config = Self::new(database_url);
        if let Some(raw) = lookup(POOL_SIZE_ENV) {
            config.max_pool_size = parse_pool_size(&raw)?;
        }
        if let Some(raw) = lookup(CONNECT_TIMEOUT_ENV) {
            config.connection_timeout = parse_timeout(&raw)?;
        }
        Ok(config)
    }

    /// Returns the database URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum pool size.
    #[must_use]
    pub const fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }

    /// Returns the connection checkout timeout.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Builds the shared connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot establish its
    /// initial connections.
    pub fn build_pool(&self) -> Result<CadernosPgPool, ConfigError> {
        tracing::info!(
            max_pool_size = self.max_pool_size,
            connection_timeout_secs = self.connection_timeout.as_secs(),
            "building notebook store connection pool"
        );
        let manager = ConnectionManager::<PgConnection>::new(self.database_url.as_str());
        let pool = Pool::builder()
            .max_size(self.max_pool_size)
            .connection_timeout(self.connection_timeout)
            .build(manager)?;
        Ok(pool)
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        variable: POOL_SIZE_ENV,
        value: raw.to_owned(),
        reason,
    };
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| invalid(err.to_string()))?;
    if size == 0 {
        return Err(invalid(String::from("pool size must be positive")));
    }
    Ok(size)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let seconds = raw
        .trim()
        .parse::<u64>()
        .map_err(|err| ConfigError::InvalidValue {
            variable: CONNECT_TIMEOUT_ENV,
            value: raw.to_owned(),
            reason: err.to_string(),
        })?;
    Ok(Duration::from_secs(seconds))
}
