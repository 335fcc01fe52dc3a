//! Supplier spend ranking

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::PurchaseRecord;
use std::collections::HashMap;

use crate::utils::money::{percent_of, serialize_money, to_decimal};

const UNKNOWN_VENDOR: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierRank {
    pub vendor: String,
    #[serde(serialize_with = "serialize_money")]
    pub total_spend: Decimal,
    pub purchase_count: usize,
    #[serde(serialize_with = "serialize_money")]
    pub average_order: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub share_of_spend: Decimal,
}

/// Vendors by total spend (descending, then name)
pub fn rank_suppliers(purchases: &[PurchaseRecord]) -> Vec<SupplierRank> {
    let mut by_vendor: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for purchase in purchases {
        let vendor = purchase
            .vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_VENDOR);
        let entry = by_vendor.entry(vendor).or_insert((Decimal::ZERO, 0));
        entry.0 += to_decimal(purchase.total_amount);
        entry.1 += 1;
    }

    let grand_total: Decimal = by_vendor.values().map(|(spend, _)| *spend).sum();

    let mut ranks: Vec<SupplierRank> = by_vendor
        .into_iter()
        .map(|(vendor, (total_spend, count))| SupplierRank {
            vendor: vendor.to_string(),
            total_spend,
            purchase_count: count,
            average_order: total_spend / Decimal::from(count),
            share_of_spend: percent_of(total_spend, grand_total),
        })
        .collect();

    ranks.sort_by(|a, b| {
        b.total_spend
            .cmp(&a.total_spend)
            .then_with(|| a.vendor.cmp(&b.vendor))
    });
    ranks
}
