use async_trait::async_trait;
use shared::models::{InventorySnapshot, ItemCategory, PurchaseRecord, SaleRecord, WasteRecord};
use sqlx::SqlitePool;

use super::{DateRange, LedgerSource};
use crate::db::repository::{self, RepoError};
use crate::utils::{AppError, AppResult};

/// [`LedgerSource`] over the SQLite ledger tables
#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn read_failed(source: &'static str, tenant_id: &str, err: RepoError) -> AppError {
    tracing::error!(tenant_id = %tenant_id, source, error = %err, "Ledger read failed");
    AppError::ledger_read(source, err.to_string()).with_detail("tenant_id", tenant_id)
}

#[async_trait]
impl LedgerSource for SqliteLedger {
    async fn purchases(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<PurchaseRecord>> {
        repository::purchase::find_by_range(&self.pool, tenant_id, range.start, range.end)
            .await
            .map_err(|e| read_failed("purchases", tenant_id, e))
    }

    async fn sales(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<SaleRecord>> {
        repository::sale::find_by_range(&self.pool, tenant_id, range.start, range.end)
            .await
            .map_err(|e| read_failed("sales", tenant_id, e))
    }

    async fn waste(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<WasteRecord>> {
        repository::waste::find_by_range(&self.pool, tenant_id, range.start, range.end)
            .await
            .map_err(|e| read_failed("waste", tenant_id, e))
    }

    async fn inventory(&self, tenant_id: &str) -> AppResult<Vec<InventorySnapshot>> {
        repository::inventory::find_by_tenant(&self.pool, tenant_id)
            .await
            .map_err(|e| read_failed("inventory", tenant_id, e))
    }

    async fn purchase_categories(&self, tenant_id: &str) -> AppResult<Vec<ItemCategory>> {
        repository::purchase::categories_by_item(&self.pool, tenant_id)
            .await
            .map_err(|e| read_failed("purchases", tenant_id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use chrono::NaiveDate;
    use shared::ErrorCode;
    use shared::models::{PurchaseCreate, SaleCreate, WasteCreate};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_reads_through_repositories() {
        let pool = test_pool().await;
        repository::purchase::create(&pool, "t-1", PurchaseCreate::new(d(2), "Sysco", 300.0))
            .await
            .unwrap();
        repository::sale::create(&pool, "t-1", SaleCreate::new(d(2), 1000.0))
            .await
            .unwrap();
        repository::waste::create(&pool, "t-1", WasteCreate::new(d(3), "Bread", 12.0))
            .await
            .unwrap();

        let ledger = SqliteLedger::new(pool);
        let range = DateRange::new(d(1), d(7));
        assert_eq!(ledger.purchases("t-1", range).await.unwrap().len(), 1);
        assert_eq!(ledger.sales("t-1", range).await.unwrap().len(), 1);
        assert_eq!(ledger.waste("t-1", range).await.unwrap().len(), 1);
        assert!(ledger.inventory("t-1").await.unwrap().is_empty());
        assert!(ledger.purchase_categories("t-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_pool_surfaces_ledger_read_failed() {
        let pool = test_pool().await;
        pool.close().await;

        let ledger = SqliteLedger::new(pool);
        let err = ledger
            .sales("t-1", DateRange::new(d(1), d(7)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LedgerReadFailed);
        assert_eq!(err.details.unwrap().get("source").unwrap(), "sales");
    }
}
