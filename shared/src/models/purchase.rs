//! Purchase Model (supplier invoices)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Invoice line item (independent table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PurchaseLineItem {
    pub id: i64,
    pub purchase_id: i64,
    pub item_name: String,
    /// Ingredient category ("Produce", "Seafood", ...). Empty or NULL when unknown.
    pub category: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
}

impl PurchaseLineItem {
    /// quantity × unit price
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Category if present and non-blank
    pub fn known_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Purchase - one supplier invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PurchaseRecord {
    pub id: i64,
    pub tenant_id: String,
    pub purchase_date: NaiveDate,
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    pub total_amount: f64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub line_items: Vec<PurchaseLineItem>,
}

/// Category an item was bought under, taken from the whole purchase history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ItemCategory {
    pub item_name: String,
    pub category: String,
}

/// Line item payload for [`PurchaseCreate`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItemInput {
    pub item_name: String,
    pub category: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
}

/// Create purchase payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCreate {
    pub purchase_date: NaiveDate,
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    pub total_amount: f64,
    #[serde(default)]
    pub items: Vec<PurchaseItemInput>,
}

impl PurchaseCreate {
    pub fn new(purchase_date: NaiveDate, vendor: impl Into<String>, total_amount: f64) -> Self {
        Self {
            purchase_date,
            vendor: Some(vendor.into()),
            invoice_number: None,
            total_amount,
            items: Vec::new(),
        }
    }

    /// Append a line item (builder style)
    pub fn with_item(
        mut self,
        item_name: impl Into<String>,
        category: Option<&str>,
        quantity: f64,
        unit_price: f64,
    ) -> Self {
        self.items.push(PurchaseItemInput {
            item_name: item_name.into(),
            category: category.map(str::to_string),
            quantity,
            unit_price,
        });
        self
    }
}
