use async_trait::async_trait;
use serde_json::{Map, Value};

use super::options::QueryOptions;
use crate::shared::DomainResult;

/// A stored resource as a JSON object.
pub type Document = Map<String, Value>;

/// Read capability over one set of resource documents.
#[async_trait]
pub trait ResourceCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Execute a fully assembled query, expanding its relations.
    async fn find(&self, options: &QueryOptions) -> DomainResult<Vec<Document>>;

    /// Number of documents in the whole collection, ignoring any filter.
    async fn count_documents(&self) -> DomainResult<u64>;
}
