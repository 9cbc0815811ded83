//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod geocoding;
pub mod storage;
pub mod uploads;

pub use database::repositories::StoreRepositoryProvider;
pub use database::{init_database, DatabaseConfig};
pub use geocoding::build_geocoder;
pub use uploads::PhotoStorage;
