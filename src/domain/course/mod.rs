//! Course aggregate

pub mod model;
pub mod repository;

mod dto;

pub use dto::{CreateCourseDto, UpdateCourseDto};
pub use model::{average_tuition, Course, MinimumSkill};
pub use repository::CourseRepository;

/// Collection name in the document store
pub const COLLECTION: &str = "courses";
