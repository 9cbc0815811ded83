use async_trait::async_trait;

use super::Bootcamp;
use crate::domain::query::FilterExpr;
use crate::shared::DomainResult;

#[async_trait]
pub trait BootcampRepository: Send + Sync {
    async fn create(&self, bootcamp: &Bootcamp) -> DomainResult<()>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Bootcamp>>;
    async fn find_by_owner(&self, user_id: &str) -> DomainResult<Option<Bootcamp>>;
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Bootcamp>>;
    async fn find(&self, filter: FilterExpr) -> DomainResult<Vec<Bootcamp>>;
    async fn update(&self, bootcamp: &Bootcamp) -> DomainResult<()>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
    async fn delete_all(&self) -> DomainResult<u64>;
}
