pub mod collection;
pub mod engine;
mod memory;
pub mod repository;
mod sqlite;
mod traits;

pub use collection::StoreCollection;
pub use memory::{InMemoryDocumentStore, InMemoryUserRepository};
pub use repository::DocumentRepository;
pub use sqlite::SqliteDocumentStore;
pub use traits::{document_id, DocumentStore};
