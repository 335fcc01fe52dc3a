//! Shared types for the profit engine
//!
//! Ledger record types consumed by the analytics core, plus the unified
//! error system and response envelope used by every caller.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
