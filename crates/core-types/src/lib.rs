pub mod error;
pub mod person;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use person::{Enrichment, Pagination, Person, PersonFilter, PersonPayload};
