//! Bootcamps module: CRUD, radius search, photo upload, nested courses

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
