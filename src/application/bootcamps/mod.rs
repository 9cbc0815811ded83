pub mod service;

pub use service::{BootcampService, PhotoUpload};
