use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::collection::{Document, ResourceCollection};
use super::filter::build_filter;
use super::options::{QueryOptions, RelationSpec, SortSpec};
use super::pagination::PaginationResult;
use super::request_query::RequestQuery;
use crate::shared::DomainResult;

pub const DEFAULT_SORT: &str = "-createdAt";

/// Uniform body of every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResultEnvelope {
    pub success: bool,
    /// Number of documents in `data`
    pub count: usize,
    pub pagination: PaginationResult,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Document>,
}

/// Translate `query` into [`QueryOptions`] without executing anything.
pub fn build_options(query: &RequestQuery, relations: &[RelationSpec]) -> QueryOptions {
    let mut options = QueryOptions::new().with_filter(build_filter(query));

    if let Some(fields) = query.select() {
        options = options.with_projection(fields);
    }

    let sort = query
        .sort()
        .map(|keys| SortSpec::parse_list(keys.as_slice()))
        .filter(|specs| !specs.is_empty())
        .unwrap_or_else(|| SortSpec::parse_list(&[DEFAULT_SORT]));

    let pagination = query.pagination();

    options
        .with_sort(sort)
        .with_skip(pagination.start_index())
        .with_limit(pagination.limit)
        .with_relations(relations.to_vec())
}

/// Run a list request against `collection` and build its envelope.
///
/// Pagination links are computed from the unfiltered collection total.
pub async fn advanced_results(
    collection: &dyn ResourceCollection,
    relations: &[RelationSpec],
    query: &RequestQuery,
) -> DomainResult<ResultEnvelope> {
    let options = build_options(query, relations);
    let pagination = query.pagination();

    let total = collection.count_documents().await?;
    let data = collection.find(&options).await?;

    debug!(
        collection = collection.name(),
        page = pagination.page,
        limit = pagination.limit,
        total,
        returned = data.len(),
        "Advanced results"
    );

    Ok(ResultEnvelope {
        success: true,
        count: data.len(),
        pagination: pagination.links(total),
        data,
    })
}
