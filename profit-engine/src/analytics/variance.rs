//! Purchase price variance across vendors and dates

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::PurchaseRecord;
use shared::util::normalize_item_name;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::SavingsThresholds;
use crate::ledger::DateRange;
use crate::utils::money::{percent_of, serialize_money, to_decimal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceVariance {
    pub item_name: String,
    #[serde(serialize_with = "serialize_money")]
    pub min_price: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub max_price: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub avg_price: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub variance_percent: Decimal,
    pub severity: Severity,
    pub vendors: Vec<String>,
    pub purchase_count: usize,
    /// Σ (unit price − best price) × quantity
    #[serde(serialize_with = "serialize_money")]
    pub overspend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceReport {
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub items: Vec<PriceVariance>,
    #[serde(serialize_with = "serialize_money")]
    pub total_overspend: Decimal,
}

impl VarianceReport {
    pub fn new(range: DateRange, items: Vec<PriceVariance>) -> Self {
        let total_overspend = items.iter().map(|v| v.overspend).sum();
        Self {
            start_date: range.start,
            end_date: range.end,
            items,
            total_overspend,
        }
    }
}

#[derive(Default)]
struct PriceGroup {
    display_name: String,
    /// (unit price, quantity)
    lines: Vec<(Decimal, Decimal)>,
    vendors: BTreeSet<String>,
}

/// Items whose price spread exceeds the minimum variance, largest spread first
pub fn detect_variance(purchases: &[PurchaseRecord], thresholds: &SavingsThresholds) -> Vec<PriceVariance> {
    let mut groups: BTreeMap<String, PriceGroup> = BTreeMap::new();

    for purchase in purchases {
        for line in &purchase.line_items {
            let key = normalize_item_name(&line.item_name);
            if key.is_empty() {
                continue;
            }
            let group = groups.entry(key).or_default();
            if group.display_name.is_empty() {
                group.display_name = line.item_name.trim().to_string();
            }
            group
                .lines
                .push((to_decimal(line.unit_price), to_decimal(line.quantity)));
            if let Some(vendor) = purchase.vendor.as_deref().filter(|v| !v.trim().is_empty()) {
                group.vendors.insert(vendor.trim().to_string());
            }
        }
    }

    let min_percent = to_decimal(thresholds.variance_min_percent);
    let medium_percent = to_decimal(thresholds.variance_medium_percent);
    let high_percent = to_decimal(thresholds.variance_high_percent);

    let mut variances: Vec<PriceVariance> = groups
        .into_values()
        .filter(|g| g.lines.len() >= 2)
        .filter_map(|g| {
            let prices = g.lines.iter().map(|(price, _)| *price);
            let min_price = prices.clone().min()?;
            let max_price = prices.clone().max()?;
            let avg_price = prices.sum::<Decimal>() / Decimal::from(g.lines.len());
            if avg_price <= Decimal::ZERO {
                return None;
            }

            let variance_percent = percent_of(max_price - min_price, avg_price);
            if variance_percent <= min_percent {
                return None;
            }

            let severity = if variance_percent > high_percent {
                Severity::High
            } else if variance_percent > medium_percent {
                Severity::Medium
            } else {
                Severity::Low
            };
            let overspend = g
                .lines
                .iter()
                .map(|(price, qty)| (*price - min_price) * *qty)
                .sum();

            Some(PriceVariance {
                item_name: g.display_name,
                min_price,
                max_price,
                avg_price,
                variance_percent,
                severity,
                vendors: g.vendors.into_iter().collect(),
                purchase_count: g.lines.len(),
                overspend,
            })
        })
        .collect();

    variances.sort_by(|a, b| b.variance_percent.cmp(&a.variance_percent));
    variances
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::{PurchaseLineItem, PurchaseRecord};

    fn purchase(vendor: &str, lines: &[(&str, f64, f64)]) -> PurchaseRecord {
        PurchaseRecord {
            id: 1,
            tenant_id: "t".into(),
            purchase_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            vendor: Some(vendor.into()),
            invoice_number: None,
            total_amount: lines.iter().map(|(_, q, p)| q * p).sum(),
            line_items: lines
                .iter()
                .map(|(name, qty, price)| PurchaseLineItem {
                    id: 0,
                    purchase_id: 1,
                    item_name: (*name).into(),
                    category: None,
                    quantity: *qty,
                    unit_price: *price,
                })
                .collect(),
        }
    }

    #[test]
    fn test_detects_spread_and_overspend() {
        let purchases = vec![
            purchase("Sysco", &[("Chicken Breast", 10.0, 4.0)]),
            purchase("US Foods", &[("chicken breast", 20.0, 5.0)]),
            purchase("Sysco", &[("Salt", 1.0, 2.0), ("Salt", 1.0, 2.0)]),
        ];
        let found = detect_variance(&purchases, &SavingsThresholds::default());
        assert_eq!(found.len(), 1);

        let chicken = &found[0];
        assert_eq!(chicken.item_name, "Chicken Breast");
        assert_eq!(chicken.min_price, Decimal::from(4));
        assert_eq!(chicken.max_price, Decimal::from(5));
        // (5 - 4) / 4.5 ≈ 22.2%
        assert_eq!(chicken.severity, Severity::High);
        assert_eq!(chicken.overspend, Decimal::from(20));
        assert_eq!(chicken.vendors, vec!["Sysco".to_string(), "US Foods".to_string()]);
        assert_eq!(chicken.purchase_count, 2);
    }

    #[test]
    fn test_single_price_and_small_spread_ignored() {
        let purchases = vec![
            purchase("A", &[("Flour", 50.0, 1.0)]),
            purchase("A", &[("Oil", 1.0, 10.0)]),
            purchase("B", &[("Oil", 1.0, 10.5)]),
        ];
        assert!(detect_variance(&purchases, &SavingsThresholds::default()).is_empty());
    }

    #[test]
    fn test_severity_bands() {
        let purchases = vec![
            // (11.6 - 10) / 10.8 ≈ 14.8%
            purchase("A", &[("Rice", 1.0, 10.0), ("Rice", 1.0, 11.6)]),
            // (11.8 - 10) / 10.9 ≈ 16.5%
            purchase("A", &[("Beans", 1.0, 10.0), ("Beans", 1.0, 11.8)]),
        ];
        let found = detect_variance(&purchases, &SavingsThresholds::default());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].item_name, "Beans");
        assert_eq!(found[0].severity, Severity::Medium);
        assert_eq!(found[1].severity, Severity::Low);
    }

    #[test]
    fn test_report_total() {
        let purchases = vec![
            purchase("Sysco", &[("Chicken", 10.0, 4.0)]),
            purchase("Metro", &[("Chicken", 10.0, 6.0)]),
        ];
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        let report = VarianceReport::new(range, detect_variance(&purchases, &SavingsThresholds::default()));
        assert_eq!(report.total_overspend, Decimal::from(20));
        assert_eq!(report.items.len(), 1);
    }
}
