pub mod access;
pub mod bootcamp;
pub mod course;
pub mod geo;
pub mod query;
pub mod repositories;
pub mod user;

// Re-export commonly used types
pub use bootcamp::{Bootcamp, BootcampRepository, Career};
pub use course::{Course, CourseRepository, MinimumSkill};
pub use geo::{GeoLocation, GeocodedAddress, Geocoder};
pub use repositories::RepositoryProvider;
pub use user::{CreateUserDto, User, UserRepositoryInterface, UserRole};

pub use crate::shared::{DomainError, DomainResult};
