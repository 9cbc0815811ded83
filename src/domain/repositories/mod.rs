//! Repository traits for the domain layer
//!
//! `RepositoryProvider` gives unified access to the per-aggregate
//! repositories and to the read-only collection handles used by list
//! endpoints:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) {
//!     let bootcamp = repos.bootcamps().find_by_id("b1").await?;
//!     let courses = repos.courses().find_by_bootcamp("b1").await?;
//! }
//! ```

use std::sync::Arc;

use super::bootcamp::BootcampRepository;
use super::course::CourseRepository;
use super::query::ResourceCollection;
use super::user::UserRepositoryInterface;

pub trait RepositoryProvider: Send + Sync {
    fn bootcamps(&self) -> &dyn BootcampRepository;
    fn courses(&self) -> &dyn CourseRepository;
    fn users(&self) -> Arc<dyn UserRepositoryInterface>;

    /// Collection handle over a named document collection.
    fn collection(&self, name: &str) -> Arc<dyn ResourceCollection>;
}
