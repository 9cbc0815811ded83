//! Courses module: list, get, update, delete (creation is nested under bootcamps)

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
