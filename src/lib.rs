//! # Bootcamp Directory API
//!
//! REST service for coding bootcamps, the courses they offer and the user
//! accounts that publish them. List endpoints share one query layer
//! (filtering, projection, sorting, pagination and relation expansion).
//!
//! ## Architecture
//!
//! - **domain**: resource models, repository traits and the query builder
//! - **application**: use cases (accounts, bootcamps, courses)
//! - **infrastructure**: document stores, SeaORM database, crypto, geocoding, uploads
//! - **interfaces**: axum HTTP API with Swagger documentation
//! - **server**: runtime bootstrap and graceful shutdown
//! - **seeder**: JSON import/wipe of sample data

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod seeder;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, StoreRepositoryProvider};

pub use interfaces::http::create_api_router;
