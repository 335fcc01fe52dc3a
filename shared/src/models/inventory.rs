//! Inventory Model (current stock snapshot)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inventory snapshot row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventorySnapshot {
    pub id: i64,
    pub tenant_id: String,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl InventorySnapshot {
    /// Stock value at the recorded unit price (0 when unpriced)
    pub fn stock_value(&self) -> f64 {
        self.quantity * self.unit_price.unwrap_or(0.0)
    }
}

/// Create inventory item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemCreate {
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl InventoryItemCreate {
    pub fn new(item_name: impl Into<String>, quantity: f64) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
            unit_price: None,
            category: None,
            expiry_date: None,
        }
    }

    pub fn with_price(mut self, unit_price: f64) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn expiring(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_value() {
        let mut item = InventorySnapshot {
            id: 1,
            tenant_id: "t".into(),
            item_name: "Milk".into(),
            quantity: 3.0,
            unit_price: Some(2.5),
            category: None,
            expiry_date: None,
        };
        assert_eq!(item.stock_value(), 7.5);

        item.unit_price = None;
        assert_eq!(item.stock_value(), 0.0);
    }
}
