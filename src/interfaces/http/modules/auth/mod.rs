//! Authentication module: register, login, current user, password reset, logout

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
