//! Waste Model (waste log entries)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Waste record - one discarded item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WasteRecord {
    pub id: i64,
    pub tenant_id: String,
    pub waste_date: NaiveDate,
    pub item_name: String,
    pub quantity: f64,
    /// Dollar value of the discarded stock
    pub cost_value: f64,
    /// "spoilage", "overproduction", "dropped", ...
    pub reason: Option<String>,
}

/// Create waste payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteCreate {
    pub waste_date: NaiveDate,
    pub item_name: String,
    pub quantity: f64,
    pub cost_value: f64,
    pub reason: Option<String>,
}

impl WasteCreate {
    pub fn new(waste_date: NaiveDate, item_name: impl Into<String>, cost_value: f64) -> Self {
        Self {
            waste_date,
            item_name: item_name.into(),
            quantity: 1.0,
            cost_value,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
