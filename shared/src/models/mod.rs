//! Ledger data models
//!
//! Read-only inputs of the analytics core. Records are owned by external
//! collaborators (invoice upload, POS sync, waste logging).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod inventory;
pub mod purchase;
pub mod sale;
pub mod waste;

// Re-exports
pub use inventory::*;
pub use purchase::*;
pub use sale::*;
pub use waste::*;
