//! HTTP REST API
//!
//! - `common`: response envelopes, error mapping, validated JSON, cookies
//! - `middleware`: auth guards, advanced results, request id, metrics
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;

pub use router::{create_api_router, ApiDoc, RouterOptions};
pub use state::ApiState;
