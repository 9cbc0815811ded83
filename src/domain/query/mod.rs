//! Advanced results
//!
//! Turns a list request's query string into a bounded, sorted, projected and
//! relation-expanded read against a [`ResourceCollection`], plus pagination
//! metadata. Execution is delegated to the collection handle.

pub mod collection;
pub mod filter;
pub mod options;
pub mod pagination;
pub mod request_query;
pub mod results;

pub use collection::{Document, ResourceCollection};
pub use filter::{build_filter, CmpOp, FilterExpr, FilterNode, FilterValue};
pub use options::{Order, QueryOptions, RelationKind, RelationSpec, SortSpec};
pub use pagination::{
    PageLink, Pagination, PaginationResult, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, MAX_PAGE,
};
pub use request_query::{QueryValue, RequestQuery, CONTROL_PARAMS};
pub use results::{advanced_results, build_options, ResultEnvelope, DEFAULT_SORT};
