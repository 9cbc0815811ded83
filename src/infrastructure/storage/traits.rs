//! Document store trait definitions

use async_trait::async_trait;

use crate::domain::query::{Document, FilterExpr, QueryOptions};
use crate::shared::{DomainError, DomainResult};

/// Persistence for JSON documents grouped into named collections.
///
/// Every document carries its identifier as a string `_id` field.
/// `find` applies filter, sort, skip/limit and projection but never
/// expands relations; that is the collection handle's job.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, doc: Document) -> DomainResult<()>;
    async fn find_by_id(&self, collection: &str, id: &str) -> DomainResult<Option<Document>>;
    /// Replace the stored document with the same `_id`; `false` if absent.
    async fn replace(&self, collection: &str, doc: Document) -> DomainResult<bool>;
    async fn delete(&self, collection: &str, id: &str) -> DomainResult<bool>;
    async fn delete_many(&self, collection: &str, filter: &FilterExpr) -> DomainResult<u64>;
    async fn find(&self, collection: &str, options: &QueryOptions) -> DomainResult<Vec<Document>>;
    async fn count(&self, collection: &str, filter: &FilterExpr) -> DomainResult<u64>;
}

pub fn document_id(doc: &Document) -> DomainResult<&str> {
    doc.get("_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DomainError::Validation("Document is missing a string _id".into()))
}
