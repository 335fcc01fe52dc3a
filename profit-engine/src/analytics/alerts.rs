//! Operational alerts over stock and month-to-date figures
//!
//! - [`slow_moving_items`]: stock with no recent sale
//! - [`action_items`]: targets missed this month plus stock problems
//! - [`all_alerts`]: expiring and low-stock items in one severity-ordered feed

use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{InventorySnapshot, PurchaseRecord, SaleRecord};
use shared::util::normalize_item_name;
use std::collections::HashMap;

use super::inventory::{StockSeverity, expiring_items, low_stock_items};
use super::profit_loss::ProfitLossResult;
use crate::core::{AnalyticsConfig, InventoryThresholds};
use crate::utils::money::{format_percent, to_decimal};

// ============================================================================
// Slow moving stock
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowMovingItem {
    pub item_name: String,
    pub quantity: f64,
    pub category: Option<String>,
    pub last_sale_date: Option<NaiveDate>,
    pub last_purchase_date: Option<NaiveDate>,
    /// From the last sale, else the last purchase; None with neither on record
    pub days_since_last_sale: Option<i64>,
    pub expiry_date: Option<NaiveDate>,
    pub is_expiring_soon: bool,
}

fn latest_by_item<'a>(dated_names: impl Iterator<Item = (NaiveDate, &'a str)>) -> HashMap<String, NaiveDate> {
    let mut latest: HashMap<String, NaiveDate> = HashMap::new();
    for (date, name) in dated_names {
        latest
            .entry(normalize_item_name(name))
            .and_modify(|d| *d = (*d).max(date))
            .or_insert(date);
    }
    latest
}

/// In-stock items not sold for more than `slow_moving_days`, stalest first
pub fn slow_moving_items(
    inventory: &[InventorySnapshot],
    sales: &[SaleRecord],
    purchases: &[PurchaseRecord],
    today: NaiveDate,
    thresholds: &InventoryThresholds,
) -> Vec<SlowMovingItem> {
    let last_sold = latest_by_item(
        sales
            .iter()
            .flat_map(|s| s.line_items.iter().map(move |l| (s.sale_date, l.item_name.as_str()))),
    );
    let last_bought = latest_by_item(
        purchases
            .iter()
            .flat_map(|p| p.line_items.iter().map(move |l| (p.purchase_date, l.item_name.as_str()))),
    );

    let mut items: Vec<SlowMovingItem> = inventory
        .iter()
        .filter(|item| item.quantity > 0.0)
        .filter_map(|item| {
            let key = normalize_item_name(&item.item_name);
            let last_sale_date = last_sold.get(&key).copied();
            let last_purchase_date = last_bought.get(&key).copied();
            if let Some(sold) = last_sale_date
                && (today - sold).num_days() <= thresholds.slow_moving_days
            {
                return None;
            }

            Some(SlowMovingItem {
                item_name: item.item_name.clone(),
                quantity: item.quantity,
                category: item.category.clone(),
                last_sale_date,
                last_purchase_date,
                days_since_last_sale: last_sale_date
                    .or(last_purchase_date)
                    .map(|d| (today - d).num_days()),
                expiry_date: item.expiry_date,
                is_expiring_soon: item
                    .expiry_date
                    .is_some_and(|e| (e - today).num_days() <= thresholds.expiring_soon_days),
            })
        })
        .collect();

    // 无记录的排最后
    items.sort_by(|a, b| {
        b.days_since_last_sale
            .unwrap_or(i64::MIN)
            .cmp(&a.days_since_last_sale.unwrap_or(i64::MIN))
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    items
}

// ============================================================================
// Action items
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionItem {
    pub id: String,
    pub priority: ActionPriority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionItems {
    pub items: Vec<ActionItem>,
    pub count: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
}

/// Targets missed in `pl` (month to date) and stock needing attention
pub fn action_items(
    pl: &ProfitLossResult,
    inventory: &[InventorySnapshot],
    today: NaiveDate,
    config: &AnalyticsConfig,
) -> ActionItems {
    let targets = &config.targets;
    let mut items = Vec::new();
    let mut push = |id: &str, priority: ActionPriority, category: &str, title: String, description: String, action: &str| {
        items.push(ActionItem {
            id: id.into(),
            priority,
            category: category.into(),
            title,
            description,
            action: action.into(),
        })
    };

    let food_target = to_decimal(targets.food_cost_percent);
    if pl.food_cost_percent > food_target {
        push(
            "FOOD_COST_HIGH",
            ActionPriority::High,
            "Food Cost",
            format!(
                "Food cost {} (target: {}%)",
                format_percent(pl.food_cost_percent),
                targets.food_cost_percent
            ),
            format!("Food cost is {} over target", format_percent(pl.food_cost_percent - food_target)),
            "Review purchasing patterns and negotiate better supplier prices",
        );
    }

    let waste_target = to_decimal(targets.waste_percent);
    if pl.waste_percent > waste_target {
        push(
            "WASTE_HIGH",
            ActionPriority::High,
            "Waste",
            format!(
                "Waste {} (target: {}%)",
                format_percent(pl.waste_percent),
                targets.waste_percent
            ),
            format!("Waste is {} over target", format_percent(pl.waste_percent - waste_target)),
            "Review waste tracking and improve inventory management",
        );
    }

    // 人工成本没有账本, 按估算比例比较
    let labor_rate = to_decimal(config.labor_rate_percent);
    let labor_target = to_decimal(targets.labor_percent);
    if labor_rate > labor_target {
        push(
            "LABOR_COST_HIGH",
            ActionPriority::Medium,
            "Labor",
            format!(
                "Labor cost {} (target: {}%)",
                format_percent(labor_rate),
                targets.labor_percent
            ),
            format!("Labor cost is {} over target", format_percent(labor_rate - labor_target)),
            "Review staffing levels and optimize schedules",
        );
    }

    let low_stock = low_stock_items(inventory, config.inventory.low_stock_threshold);
    if !low_stock.is_empty() {
        push(
            "LOW_STOCK",
            ActionPriority::Medium,
            "Inventory",
            "Low stock items detected".into(),
            format!("{} items are running low", low_stock.len()),
            "Review inventory and place orders for low stock items",
        );
    }

    let days_ahead = config.inventory.expiring_days_ahead;
    let expiring = expiring_items(inventory, today, days_ahead);
    if !expiring.is_empty() {
        push(
            "EXPIRING_ITEMS",
            ActionPriority::High,
            "Inventory",
            format!("{} items expiring soon", expiring.len()),
            format!("{} items will expire within {} days", expiring.len(), days_ahead),
            "Use or sell expiring items to prevent waste",
        );
    }

    let count_of = |priority: ActionPriority| items.iter().filter(|i| i.priority == priority).count();
    ActionItems {
        count: items.len(),
        high_priority: count_of(ActionPriority::High),
        medium_priority: count_of(ActionPriority::Medium),
        items,
    }
}

// ============================================================================
// Alert feed
// ============================================================================

/// Ordered most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Expiring,
    LowStock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub item_name: String,
    pub category: Option<String>,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFeed {
    pub alerts: Vec<Alert>,
    pub count: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

/// Expiring then low-stock alerts, stably ordered by severity
pub fn all_alerts(inventory: &[InventorySnapshot], today: NaiveDate, thresholds: &InventoryThresholds) -> AlertFeed {
    let mut alerts: Vec<Alert> = expiring_items(inventory, today, thresholds.expiring_days_ahead)
        .into_iter()
        .map(|item| {
            let severity = if item.is_expired {
                AlertSeverity::Critical
            } else if item.days_until_expiry <= 2 {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            };
            let message = if item.is_expired {
                format!("{} has expired", item.item_name)
            } else {
                format!("{} will expire in {} days", item.item_name, item.days_until_expiry)
            };
            Alert {
                id: format!("EXP_{}", item.item_name),
                kind: AlertKind::Expiring,
                severity,
                title: format!("{} expiring soon", item.item_name),
                message,
                item_name: item.item_name,
                category: item.category,
                quantity: item.quantity,
                expiry_date: Some(item.expiry_date),
                days_until_expiry: Some(item.days_until_expiry),
            }
        })
        .collect();

    // 数量为 0 的不算低库存提醒
    alerts.extend(
        low_stock_items(inventory, thresholds.low_stock_threshold)
            .into_iter()
            .filter(|item| item.quantity > 0.0)
            .map(|item| Alert {
                id: format!("LOW_{}", item.item_name),
                kind: AlertKind::LowStock,
                severity: match item.severity {
                    StockSeverity::High => AlertSeverity::High,
                    StockSeverity::Medium => AlertSeverity::Medium,
                },
                title: format!("{} running low", item.item_name),
                message: format!("{} has only {} units remaining", item.item_name, item.quantity),
                item_name: item.item_name,
                category: item.category,
                quantity: item.quantity,
                expiry_date: None,
                days_until_expiry: None,
            }),
    );

    alerts.sort_by_key(|a| a.severity);
    let count_of = |severity: AlertSeverity| alerts.iter().filter(|a| a.severity == severity).count();
    AlertFeed {
        count: alerts.len(),
        critical: count_of(AlertSeverity::Critical),
        high: count_of(AlertSeverity::High),
        medium: count_of(AlertSeverity::Medium),
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::CostTotals;
    use crate::analytics::period::Period;
    use crate::ledger::{DateRange, LedgerSource, MemoryLedger};
    use rust_decimal::Decimal;
    use shared::models::{PurchaseCreate, SaleCreate};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn stock(name: &str, qty: f64, expiry: Option<NaiveDate>) -> InventorySnapshot {
        InventorySnapshot {
            id: 0,
            tenant_id: "t".into(),
            item_name: name.into(),
            quantity: qty,
            unit_price: Some(2.0),
            category: Some("Dry".into()),
            expiry_date: expiry,
        }
    }

    fn month_to_date(sales: i64, purchases: i64, waste: i64) -> ProfitLossResult {
        let totals = CostTotals {
            sales: Decimal::from(sales),
            purchases: Decimal::from(purchases),
            waste: Decimal::from(waste),
            labor: Decimal::ZERO,
        };
        ProfitLossResult::from_totals(
            Period::custom(d(1), d(20), "Month to date"),
            &totals,
            &AnalyticsConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_slow_moving_items() {
        let ledger = MemoryLedger::new();
        ledger.add_sale("t", SaleCreate::new(d(18), 50.0).with_item("Rice", 5.0, 10.0));
        ledger.add_sale("t", SaleCreate::new(d(2), 50.0).with_item("beans", 5.0, 10.0));
        ledger.add_purchase(
            "t",
            PurchaseCreate::new(d(5), "Sysco", 40.0).with_item("Saffron", Some("Spice"), 1.0, 40.0),
        );
        let range = DateRange::new(d(1), d(20));
        let sales = ledger.sales("t", range).await.unwrap();
        let purchases = ledger.purchases("t", range).await.unwrap();

        let inventory = vec![
            stock("Rice", 20.0, None),
            stock("Beans", 12.0, Some(d(22))),
            stock("Saffron", 1.0, None),
            stock("Mystery", 3.0, None),
            stock("Flour", 0.0, None),
        ];
        let items = slow_moving_items(&inventory, &sales, &purchases, d(20), &InventoryThresholds::default());

        let names: Vec<_> = items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["Beans", "Saffron", "Mystery"]);
        assert_eq!(items[0].days_since_last_sale, Some(18));
        assert!(items[0].is_expiring_soon);
        assert_eq!(items[1].last_sale_date, None);
        assert_eq!(items[1].days_since_last_sale, Some(15));
        assert_eq!(items[2].days_since_last_sale, None);
    }

    #[test]
    fn test_action_items() {
        let inventory = vec![stock("Milk", 4.0, Some(d(22))), stock("Rice", 40.0, None)];
        let actions = action_items(&month_to_date(10000, 3500, 800), &inventory, d(20), &AnalyticsConfig::default());

        let ids: Vec<_> = actions.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["FOOD_COST_HIGH", "WASTE_HIGH", "LABOR_COST_HIGH", "LOW_STOCK", "EXPIRING_ITEMS"]
        );
        assert_eq!(actions.count, 5);
        assert_eq!(actions.high_priority, 3);
        assert_eq!(actions.medium_priority, 2);
        assert_eq!(actions.items[0].title, "Food cost 35.0% (target: 28%)");
        assert_eq!(actions.items[0].description, "Food cost is 7.0% over target");
        assert_eq!(actions.items[1].title, "Waste 8.0% (target: 5%)");
    }

    #[test]
    fn test_action_items_on_target() {
        let mut config = AnalyticsConfig::default();
        config.labor_rate_percent = 28.0;
        let actions = action_items(&month_to_date(10000, 2500, 100), &[], d(20), &config);
        assert!(actions.items.is_empty());
        assert_eq!(actions.count, 0);
    }

    #[test]
    fn test_all_alerts_ordering() {
        let inventory = vec![
            stock("Cream", 20.0, Some(d(25))),
            stock("Oil", 3.0, None),
            stock("Milk", 20.0, Some(d(18))),
            stock("Basil", 20.0, Some(d(21))),
            stock("Flour", 8.0, None),
            stock("Salt", 0.0, None),
        ];
        let feed = all_alerts(&inventory, d(20), &InventoryThresholds::default());

        let ids: Vec<_> = feed.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["EXP_Milk", "EXP_Basil", "LOW_Oil", "EXP_Cream", "LOW_Flour"]);
        assert_eq!(feed.alerts[0].message, "Milk has expired");
        assert_eq!(feed.alerts[1].message, "Basil will expire in 1 days");
        assert_eq!(feed.alerts[2].message, "Oil has only 3 units remaining");
        assert_eq!((feed.count, feed.critical, feed.high, feed.medium), (5, 1, 2, 2));

        let json = serde_json::to_value(&feed.alerts[2]).unwrap();
        assert_eq!(json["type"], "low_stock");
        assert!(json.get("expiry_date").is_none());
    }
}
