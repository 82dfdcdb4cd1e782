use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, Environment};

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool setup and the one-time schema bootstrap run at process start
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!("Created database pool for: {}", Self::redacted(&connection_string));
        Ok(pool)
    }

    /// Run embedded migrations. Idempotent: applied versions are skipped.
    pub async fn bootstrap(pool: &PgPool, environment: &Environment) -> Result<(), DatabaseError> {
        match environment {
            Environment::Development => {
                info!(">>> Development Environment Detected: Running migrations.")
            }
            other => info!(">>> {:?} Environment Detected: Running migrations.", other),
        }
        sqlx::migrate!("./migrations").run(pool).await?;
        info!(">>> Migrations Complete.");
        Ok(())
    }

    fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        let base = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if config.require_ssl && !url.query_pairs().any(|(k, _)| k == "sslmode") {
            url.query_pairs_mut().append_pair("sslmode", "require");
        }
        Ok(url.into())
    }

    /// Connection string with the password masked, for logs
    fn redacted(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.into()
            }
            Err(_) => "<unparseable url>".to_string(),
        }
    }
}
