//! Sale Model (POS daily sales)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sold item line (independent table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SaleLineItem {
    pub id: i64,
    pub sale_id: i64,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl SaleLineItem {
    /// quantity × unit price
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Sale - POS sales report for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SaleRecord {
    pub id: i64,
    pub tenant_id: String,
    pub sale_date: NaiveDate,
    pub total_sales: f64,
    pub total_transactions: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub line_items: Vec<SaleLineItem>,
}

/// Sold item payload for [`SaleCreate`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemInput {
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

/// Create sale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreate {
    pub sale_date: NaiveDate,
    pub total_sales: f64,
    #[serde(default)]
    pub total_transactions: i64,
    #[serde(default)]
    pub items: Vec<SaleItemInput>,
}

impl SaleCreate {
    pub fn new(sale_date: NaiveDate, total_sales: f64) -> Self {
        Self {
            sale_date,
            total_sales,
            total_transactions: 0,
            items: Vec::new(),
        }
    }

    pub fn with_transactions(mut self, total_transactions: i64) -> Self {
        self.total_transactions = total_transactions;
        self
    }

    pub fn with_item(mut self, item_name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        self.items.push(SaleItemInput {
            item_name: item_name.into(),
            quantity,
            unit_price,
        });
        self
    }
}
