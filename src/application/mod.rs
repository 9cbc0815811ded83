//! Application layer: use-cases orchestrating domain rules and repositories

pub mod bootcamps;
pub mod courses;
pub mod identity;

pub use bootcamps::{BootcampService, PhotoUpload};
pub use courses::CourseService;
pub use identity::{AuthResult, PasswordReset, UserService};
