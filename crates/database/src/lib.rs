//! # Persons Database Crate
//!
//! This crate is the storage adapter of the service: it owns the connection
//! pool, the schema migrations and every SQL statement that touches the
//! `persons` table.
//!
//! ## Public API
//!
//! - `connect`: establishes the connection pool from the application settings.
//! - `run_migrations`: applies the embedded migrations so the schema exists.
//! - `PersonStore`: the storage contract the record service depends on.
//! - `DbRepository`: the PostgreSQL implementation of `PersonStore`.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, PersonStore};
