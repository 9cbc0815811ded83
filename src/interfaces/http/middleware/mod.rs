//! Request middleware: authentication, role guards, advanced results,
//! request ids and metrics.

pub mod advanced_results;
pub mod auth;
pub mod metrics;
pub mod request_id;

pub use advanced_results::{advanced_results_middleware, AdvancedResults, AdvancedResultsState};
pub use auth::{auth_middleware, require_publisher_or_admin, AuthState, CurrentUser};
pub use metrics::http_metrics_middleware;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
