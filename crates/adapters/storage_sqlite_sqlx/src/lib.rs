//! # irrigo-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`ProgramStore`](irrigo_app::ports::ProgramStore) port
//! - Manage the `SQLite` connection pool lifecycle
//! - Run the embedded migrations on startup
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `irrigo-app` (for port traits) and `irrigo-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod program_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use program_store::SqliteProgramStore;
