//! Inventory alerts: expiring stock and low stock

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::InventorySnapshot;

use crate::core::InventoryThresholds;
use crate::utils::money::{serialize_money, to_decimal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPriority {
    Critical,
    High,
    Medium,
}

impl ExpiryPriority {
    fn for_days(days_until_expiry: i64) -> Self {
        match days_until_expiry {
            d if d <= 1 => Self::Critical,
            d if d <= 3 => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Critical => "Use immediately or discard",
            Self::High => "Prioritize in menu planning",
            Self::Medium => "Schedule for upcoming menu",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiringItem {
    pub item_name: String,
    pub quantity: f64,
    pub category: Option<String>,
    pub expiry_date: NaiveDate,
    /// Negative once expired
    pub days_until_expiry: i64,
    pub is_expired: bool,
    pub priority: ExpiryPriority,
    pub action: String,
    #[serde(serialize_with = "serialize_money")]
    pub value_at_risk: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockSeverity {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockItem {
    pub item_name: String,
    pub quantity: f64,
    pub category: Option<String>,
    pub severity: StockSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InventoryAlertSummary {
    pub expiring_count: usize,
    pub low_stock_count: usize,
    pub critical_count: usize,
    #[serde(serialize_with = "serialize_money")]
    pub total_value_at_risk: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryAlerts {
    pub expiring: Vec<ExpiringItem>,
    pub low_stock: Vec<LowStockItem>,
    pub summary: InventoryAlertSummary,
}

/// In-stock items expiring within `days_ahead` of `today` (expired included), soonest first
pub fn expiring_items(inventory: &[InventorySnapshot], today: NaiveDate, days_ahead: i64) -> Vec<ExpiringItem> {
    let mut items: Vec<ExpiringItem> = inventory
        .iter()
        .filter(|item| item.quantity > 0.0)
        .filter_map(|item| {
            let expiry_date = item.expiry_date?;
            let days = (expiry_date - today).num_days();
            if days > days_ahead {
                return None;
            }
            let priority = ExpiryPriority::for_days(days);
            Some(ExpiringItem {
                item_name: item.item_name.clone(),
                quantity: item.quantity,
                category: item.category.clone(),
                expiry_date,
                days_until_expiry: days,
                is_expired: days < 0,
                priority,
                action: priority.action().to_string(),
                value_at_risk: to_decimal(item.stock_value()),
            })
        })
        .collect();

    items.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date).then_with(|| a.item_name.cmp(&b.item_name)));
    items
}

/// Items under the threshold; under half of it is high severity
pub fn low_stock_items(inventory: &[InventorySnapshot], threshold: f64) -> Vec<LowStockItem> {
    let mut items: Vec<LowStockItem> = inventory
        .iter()
        .filter(|item| item.quantity < threshold)
        .map(|item| LowStockItem {
            item_name: item.item_name.clone(),
            quantity: item.quantity,
            category: item.category.clone(),
            severity: if item.quantity < threshold / 2.0 {
                StockSeverity::High
            } else {
                StockSeverity::Medium
            },
        })
        .collect();

    items.sort_by(|a, b| a.quantity.total_cmp(&b.quantity));
    items
}

pub fn inventory_alerts(
    inventory: &[InventorySnapshot],
    today: NaiveDate,
    thresholds: &InventoryThresholds,
) -> InventoryAlerts {
    let expiring = expiring_items(inventory, today, thresholds.expiring_days_ahead);
    let low_stock = low_stock_items(inventory, thresholds.low_stock_threshold);

    let summary = InventoryAlertSummary {
        expiring_count: expiring.len(),
        low_stock_count: low_stock.len(),
        critical_count: expiring
            .iter()
            .filter(|i| i.priority == ExpiryPriority::Critical)
            .count(),
        total_value_at_risk: expiring.iter().map(|i| i.value_at_risk).sum(),
    };

    InventoryAlerts {
        expiring,
        low_stock,
        summary,
    }
}
