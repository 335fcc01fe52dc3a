//! Ledger collaborators
//!
//! The analytics core never talks to storage directly. It reads tenant-scoped
//! records through [`LedgerSource`]:
//!
//! - [`SqliteLedger`]: backed by the repository layer
//! - [`MemoryLedger`]: in-process store for tests and demos

mod memory;
mod sqlite;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{InventorySnapshot, ItemCategory, PurchaseRecord, SaleRecord, WasteRecord};

use crate::utils::AppResult;
use crate::utils::time::days_inclusive;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn day_count(&self) -> i64 {
        days_inclusive(self.start, self.end)
    }
}

/// Read-only access to the tenant's ledgers
///
/// A failed read is returned as `ErrorCode::LedgerReadFailed` and is never
/// retried here.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn purchases(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<PurchaseRecord>>;

    async fn sales(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<SaleRecord>>;

    async fn waste(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<WasteRecord>>;

    async fn inventory(&self, tenant_id: &str) -> AppResult<Vec<InventorySnapshot>>;

    /// Smallest non-blank category per item name over every purchase line
    /// the tenant has recorded (no date bound)
    async fn purchase_categories(&self, tenant_id: &str) -> AppResult<Vec<ItemCategory>>;
}
