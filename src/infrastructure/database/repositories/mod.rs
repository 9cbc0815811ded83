//! Database repository implementations
//!
//! SeaORM user repository + unified RepositoryProvider.

pub mod repository_provider;
pub mod user_repository;

pub use repository_provider::StoreRepositoryProvider;
pub use user_repository::SeaOrmUserRepository;
