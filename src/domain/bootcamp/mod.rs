//! Bootcamp aggregate

pub mod model;
pub mod repository;

mod dto;

pub use dto::{CreateBootcampDto, UpdateBootcampDto};
pub use model::{
    Bootcamp, Career, DEFAULT_PHOTO, DESCRIPTION_MAX_LEN, NAME_MAX_LEN, PHONE_MAX_LEN,
};
pub use repository::BootcampRepository;

/// Collection name in the document store
pub const COLLECTION: &str = "bootcamps";
