use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use shared::models::{
    InventoryItemCreate, InventorySnapshot, ItemCategory, PurchaseCreate, PurchaseLineItem, PurchaseRecord,
    SaleCreate, SaleLineItem, SaleRecord, WasteCreate, WasteRecord,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{DateRange, LedgerSource};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Clone)]
struct TenantBook {
    purchases: Vec<PurchaseRecord>,
    sales: Vec<SaleRecord>,
    waste: Vec<WasteRecord>,
    inventory: Vec<InventorySnapshot>,
}

/// In-process [`LedgerSource`]
///
/// Records are appended with the same `*Create` payloads the SQLite
/// repositories accept. Reads of a source can be made to fail with
/// [`MemoryLedger::fail_reads`].
#[derive(Debug, Default)]
pub struct MemoryLedger {
    books: DashMap<String, TenantBook>,
    failing: DashSet<&'static str>,
    next_id: AtomicI64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn add_purchase(&self, tenant_id: &str, data: PurchaseCreate) -> PurchaseRecord {
        let id = self.id();
        let line_items = data
            .items
            .into_iter()
            .map(|item| PurchaseLineItem {
                id: self.id(),
                purchase_id: id,
                item_name: item.item_name,
                category: item.category,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        let record = PurchaseRecord {
            id,
            tenant_id: tenant_id.to_string(),
            purchase_date: data.purchase_date,
            vendor: data.vendor,
            invoice_number: data.invoice_number,
            total_amount: data.total_amount,
            line_items,
        };
        self.book(tenant_id).purchases.push(record.clone());
        record
    }

    pub fn add_sale(&self, tenant_id: &str, data: SaleCreate) -> SaleRecord {
        let id = self.id();
        let line_items = data
            .items
            .into_iter()
            .map(|item| SaleLineItem {
                id: self.id(),
                sale_id: id,
                item_name: item.item_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        let record = SaleRecord {
            id,
            tenant_id: tenant_id.to_string(),
            sale_date: data.sale_date,
            total_sales: data.total_sales,
            total_transactions: data.total_transactions,
            line_items,
        };
        self.book(tenant_id).sales.push(record.clone());
        record
    }

    pub fn add_waste(&self, tenant_id: &str, data: WasteCreate) -> WasteRecord {
        let record = WasteRecord {
            id: self.id(),
            tenant_id: tenant_id.to_string(),
            waste_date: data.waste_date,
            item_name: data.item_name,
            quantity: data.quantity,
            cost_value: data.cost_value,
            reason: data.reason,
        };
        self.book(tenant_id).waste.push(record.clone());
        record
    }

    pub fn add_inventory(&self, tenant_id: &str, data: InventoryItemCreate) -> InventorySnapshot {
        let record = InventorySnapshot {
            id: self.id(),
            tenant_id: tenant_id.to_string(),
            item_name: data.item_name,
            quantity: data.quantity,
            unit_price: data.unit_price,
            category: data.category,
            expiry_date: data.expiry_date,
        };
        self.book(tenant_id).inventory.push(record.clone());
        record
    }

    /// Make every read of `source` ("purchases", "sales", "waste", "inventory") fail
    pub fn fail_reads(&self, source: &'static str) {
        self.failing.insert(source);
    }

    fn book(&self, tenant_id: &str) -> dashmap::mapref::one::RefMut<'_, String, TenantBook> {
        self.books.entry(tenant_id.to_string()).or_default()
    }

    fn snapshot(&self, tenant_id: &str) -> TenantBook {
        self.books
            .get(tenant_id)
            .map(|b| b.value().clone())
            .unwrap_or_default()
    }

    fn check(&self, source: &'static str) -> AppResult<()> {
        if self.failing.contains(source) {
            return Err(AppError::ledger_read(source, format!("{source} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerSource for MemoryLedger {
    async fn purchases(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<PurchaseRecord>> {
        self.check("purchases")?;
        Ok(self
            .snapshot(tenant_id)
            .purchases
            .into_iter()
            .filter(|p| range.contains(p.purchase_date))
            .collect())
    }

    async fn sales(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<SaleRecord>> {
        self.check("sales")?;
        Ok(self
            .snapshot(tenant_id)
            .sales
            .into_iter()
            .filter(|s| range.contains(s.sale_date))
            .collect())
    }

    async fn waste(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<WasteRecord>> {
        self.check("waste")?;
        Ok(self
            .snapshot(tenant_id)
            .waste
            .into_iter()
            .filter(|w| range.contains(w.waste_date))
            .collect())
    }

    async fn inventory(&self, tenant_id: &str) -> AppResult<Vec<InventorySnapshot>> {
        self.check("inventory")?;
        Ok(self.snapshot(tenant_id).inventory)
    }

    async fn purchase_categories(&self, tenant_id: &str) -> AppResult<Vec<ItemCategory>> {
        self.check("purchases")?;
        let book = self.snapshot(tenant_id);
        let mut by_name: BTreeMap<&str, &str> = BTreeMap::new();
        for line in book.purchases.iter().flat_map(|p| &p.line_items) {
            if let Some(category) = line.known_category() {
                by_name
                    .entry(line.item_name.as_str())
                    .and_modify(|c| *c = (*c).min(category))
                    .or_insert(category);
            }
        }
        Ok(by_name
            .into_iter()
            .map(|(item_name, category)| ItemCategory {
                item_name: item_name.to_string(),
                category: category.to_string(),
            })
            .collect())
    }
}
