//! Advanced-results middleware for list endpoints
//!
//! Parses the raw query string into a [`RequestQuery`], runs it against the
//! route's collection and leaves the envelope in the request extensions
//! for the handler to return.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::query::{
    advanced_results, RelationSpec, RequestQuery, ResourceCollection, ResultEnvelope,
};
use crate::domain::DomainError;
use crate::interfaces::http::common::ApiError;

#[derive(Clone)]
pub struct AdvancedResultsState {
    pub collection: Arc<dyn ResourceCollection>,
    pub relations: Arc<[RelationSpec]>,
}

impl AdvancedResultsState {
    pub fn new(collection: Arc<dyn ResourceCollection>, relations: Vec<RelationSpec>) -> Self {
        Self {
            collection,
            relations: relations.into(),
        }
    }
}

/// Result of the list query. Extract with `Extension<AdvancedResults>`.
#[derive(Clone, Debug)]
pub struct AdvancedResults(pub ResultEnvelope);

pub async fn advanced_results_middleware(
    State(state): State<AdvancedResultsState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let pairs = match Query::<Vec<(String, String)>>::try_from_uri(request.uri()) {
        Ok(Query(pairs)) => pairs,
        Err(e) => {
            let message = format!("Invalid query string: {}", e.body_text());
            return ApiError(DomainError::validation(message)).into_response();
        }
    };
    let query = RequestQuery::from_pairs(pairs);
    debug!(collection = state.collection.name(), params = query.iter().count(), "Advanced results query");

    match advanced_results(state.collection.as_ref(), &state.relations, &query).await {
        Ok(envelope) => {
            request.extensions_mut().insert(AdvancedResults(envelope));
            next.run(request).await
        }
        Err(e) => ApiError(e).into_response(),
    }
}
