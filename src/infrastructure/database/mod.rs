pub mod entities;
pub mod migrator;
pub mod repositories;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./bootcamps.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./bootcamps.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
        }
    }

    /// Private in-memory database, mostly for tests
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let mut options = ConnectOptions::new(config.url.clone());
    options.sqlx_logging(false);
    // Every pooled connection to `sqlite::memory:` would be a separate database.
    if config.url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}
