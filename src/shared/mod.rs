pub mod errors;
pub mod shutdown;
pub mod slug;

pub use errors::{DomainError, DomainResult};
pub use shutdown::*;
pub use slug::slugify;
