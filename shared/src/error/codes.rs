//! Unified error codes for the profit engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 3xxx: Tenant errors
//! - 4xxx: Ledger errors
//! - 5xxx: Analytics errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 3xxx: Tenant ====================
    /// Tenant not selected
    TenantNotSelected = 3001,

    // ==================== 4xxx: Ledger ====================
    /// A ledger collaborator read failed
    LedgerReadFailed = 4001,

    // ==================== 5xxx: Analytics ====================
    /// Date range is inverted or unparseable
    InvalidDateRange = 5001,
    /// Unknown report type
    UnknownReport = 5002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            // General
            Self::Success => "Operation completed successfully",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",

            // Tenant
            Self::TenantNotSelected => "No tenant selected",

            // Ledger
            Self::LedgerReadFailed => "Failed to read ledger records",

            // Analytics
            Self::InvalidDateRange => "Invalid date range",
            Self::UnknownReport => "Unknown report type",

            // System
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),

            3001 => Ok(Self::TenantNotSelected),

            4001 => Ok(Self::LedgerReadFailed),

            5001 => Ok(Self::InvalidDateRange),
            5002 => Ok(Self::UnknownReport),

            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
