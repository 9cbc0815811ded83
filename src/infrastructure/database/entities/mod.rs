//! Database entities module

pub mod document;
pub mod user;

pub use document::Entity as Document;
pub use user::Entity as User;
