use async_trait::async_trait;

use super::Course;
use crate::shared::DomainResult;

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: &Course) -> DomainResult<()>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Course>>;
    async fn find_by_bootcamp(&self, bootcamp_id: &str) -> DomainResult<Vec<Course>>;
    async fn update(&self, course: &Course) -> DomainResult<()>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
    async fn delete_by_bootcamp(&self, bootcamp_id: &str) -> DomainResult<u64>;
    async fn delete_all(&self) -> DomainResult<u64>;
}
