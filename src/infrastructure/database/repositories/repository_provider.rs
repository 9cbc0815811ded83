//! Unified RepositoryProvider over a document store plus a user repository

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::domain::bootcamp::Bootcamp;
use crate::domain::course::Course;
use crate::domain::query::ResourceCollection;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::{BootcampRepository, CourseRepository, UserRepositoryInterface};
use crate::infrastructure::storage::repository::{
    bootcamp_repository, course_repository, DocumentRepository,
};
use crate::infrastructure::storage::{
    DocumentStore, InMemoryDocumentStore, InMemoryUserRepository, SqliteDocumentStore,
    StoreCollection,
};

use super::user_repository::SeaOrmUserRepository;

/// Holds one document store and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = StoreRepositoryProvider::sqlite(db.clone());
/// let bootcamp = repos.bootcamps().find_by_id("b1").await?;
/// let courses = repos.collection("courses");
/// ```
pub struct StoreRepositoryProvider {
    store: Arc<dyn DocumentStore>,
    bootcamps: DocumentRepository<Bootcamp>,
    courses: DocumentRepository<Course>,
    users: Arc<dyn UserRepositoryInterface>,
}

impl StoreRepositoryProvider {
    pub fn new(store: Arc<dyn DocumentStore>, users: Arc<dyn UserRepositoryInterface>) -> Self {
        Self {
            bootcamps: bootcamp_repository(store.clone()),
            courses: course_repository(store.clone()),
            store,
            users,
        }
    }

    /// Everything persisted in SQLite through one connection pool.
    pub fn sqlite(db: DatabaseConnection) -> Self {
        Self::new(
            Arc::new(SqliteDocumentStore::new(db.clone())),
            Arc::new(SeaOrmUserRepository::new(db)),
        )
    }

    /// Process-local storage, lost on restart.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}

impl RepositoryProvider for StoreRepositoryProvider {
    fn bootcamps(&self) -> &dyn BootcampRepository {
        &self.bootcamps
    }

    fn courses(&self) -> &dyn CourseRepository {
        &self.courses
    }

    fn users(&self) -> Arc<dyn UserRepositoryInterface> {
        self.users.clone()
    }

    fn collection(&self, name: &str) -> Arc<dyn ResourceCollection> {
        Arc::new(StoreCollection::new(self.store.clone(), name))
    }
}
