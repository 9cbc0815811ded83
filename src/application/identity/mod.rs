//! Identity module: registration, login, password reset
//!
//! Contains the `UserService` which orchestrates every account use-case.

pub mod service;

pub use service::{AuthResult, PasswordReset, UserService};
