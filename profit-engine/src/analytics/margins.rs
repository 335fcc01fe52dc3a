//! Per-item margins: sold lines costed against purchased lines, and a
//! menu view costed at a flat share of revenue

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{PurchaseRecord, SaleRecord};
use shared::util::normalize_item_name;
use std::collections::BTreeMap;

use crate::ledger::DateRange;
use crate::utils::money::{apply_percent, percent_of, serialize_money, to_decimal, to_f64};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMargin {
    pub item_name: String,
    pub units_sold: f64,
    #[serde(serialize_with = "serialize_money")]
    pub revenue: Decimal,
    /// Purchased cost scaled by units sold / units purchased; 0 when never bought in range
    #[serde(serialize_with = "serialize_money")]
    pub cost: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub margin_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub roi_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub avg_selling_price: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub avg_cost_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMarginReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub items: Vec<ProductMargin>,
    #[serde(serialize_with = "serialize_money")]
    pub total_revenue: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_cost: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_profit: Decimal,
    /// Unweighted mean of item margins
    #[serde(serialize_with = "serialize_money")]
    pub average_margin: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItemProfit {
    pub item_name: String,
    pub quantity_sold: f64,
    #[serde(serialize_with = "serialize_money")]
    pub revenue: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub estimated_cost: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub margin_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub avg_price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MenuSummary {
    #[serde(serialize_with = "serialize_money")]
    pub total_revenue: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_cost: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_profit: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub overall_margin: Decimal,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuProfitability {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub items: Vec<MenuItemProfit>,
    pub summary: MenuSummary,
}

/// Line totals for one item name
#[derive(Default)]
struct LineGroup {
    display_name: String,
    quantity: Decimal,
    amount: Decimal,
    price_total: Decimal,
    lines: usize,
}

impl LineGroup {
    fn add(&mut self, name: &str, quantity: f64, unit_price: f64) {
        if self.display_name.is_empty() {
            self.display_name = name.trim().to_string();
        }
        let quantity = to_decimal(quantity);
        let price = to_decimal(unit_price);
        self.quantity += quantity;
        self.amount += quantity * price;
        self.price_total += price;
        self.lines += 1;
    }

    fn avg_price(&self) -> Decimal {
        if self.lines == 0 {
            Decimal::ZERO
        } else {
            self.price_total / Decimal::from(self.lines)
        }
    }
}

fn sold_by_item(sales: &[SaleRecord]) -> BTreeMap<String, LineGroup> {
    let mut groups: BTreeMap<String, LineGroup> = BTreeMap::new();
    for line in sales.iter().flat_map(|s| &s.line_items) {
        let key = normalize_item_name(&line.item_name);
        if key.is_empty() {
            continue;
        }
        groups
            .entry(key)
            .or_default()
            .add(&line.item_name, line.quantity, line.unit_price);
    }
    groups
}

/// Margin per sold item, most profitable first
pub fn product_margins(sales: &[SaleRecord], purchases: &[PurchaseRecord], range: DateRange) -> ProductMarginReport {
    let sold = sold_by_item(sales);

    let mut bought: BTreeMap<String, LineGroup> = BTreeMap::new();
    for line in purchases.iter().flat_map(|p| &p.line_items) {
        let key = normalize_item_name(&line.item_name);
        if key.is_empty() {
            continue;
        }
        bought
            .entry(key)
            .or_default()
            .add(&line.item_name, line.quantity, line.unit_price);
    }

    let mut items: Vec<ProductMargin> = sold
        .into_iter()
        .map(|(key, sale)| {
            let purchase = bought.get(&key);
            let cost = match purchase {
                Some(p) if p.quantity > Decimal::ZERO => {
                    apply_percent(p.amount, percent_of(sale.quantity, p.quantity))
                }
                _ => Decimal::ZERO,
            };
            let profit = sale.amount - cost;
            ProductMargin {
                units_sold: to_f64(sale.quantity),
                revenue: sale.amount,
                cost,
                profit,
                margin_percent: percent_of(profit, sale.amount),
                roi_percent: percent_of(profit, cost),
                avg_selling_price: sale.avg_price(),
                avg_cost_price: purchase.map(LineGroup::avg_price).unwrap_or(Decimal::ZERO),
                item_name: sale.display_name,
            }
        })
        .collect();

    items.sort_by(|a, b| {
        b.profit
            .cmp(&a.profit)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });

    let total_revenue = items.iter().map(|m| m.revenue).sum();
    let total_cost = items.iter().map(|m| m.cost).sum();
    let total_profit = items.iter().map(|m| m.profit).sum();
    let average_margin = if items.is_empty() {
        Decimal::ZERO
    } else {
        items.iter().map(|m| m.margin_percent).sum::<Decimal>() / Decimal::from(items.len())
    };

    ProductMarginReport {
        start_date: range.start,
        end_date: range.end,
        items,
        total_revenue,
        total_cost,
        total_profit,
        average_margin,
    }
}

/// Menu items by revenue, each costed at `cost_ratio_percent` of its revenue
pub fn menu_profitability(sales: &[SaleRecord], range: DateRange, cost_ratio_percent: Decimal) -> MenuProfitability {
    let mut items: Vec<MenuItemProfit> = sold_by_item(sales)
        .into_values()
        .map(|sale| {
            let estimated_cost = apply_percent(sale.amount, cost_ratio_percent);
            let profit = sale.amount - estimated_cost;
            MenuItemProfit {
                quantity_sold: to_f64(sale.quantity),
                revenue: sale.amount,
                estimated_cost,
                profit,
                margin_percent: percent_of(profit, sale.amount),
                avg_price: sale.avg_price(),
                item_name: sale.display_name,
            }
        })
        .collect();

    items.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });

    let total_revenue: Decimal = items.iter().map(|i| i.revenue).sum();
    let total_cost: Decimal = items.iter().map(|i| i.estimated_cost).sum();
    let total_profit = total_revenue - total_cost;
    let summary = MenuSummary {
        total_revenue,
        total_cost,
        total_profit,
        overall_margin: percent_of(total_profit, total_revenue),
        item_count: items.len(),
    };

    MenuProfitability {
        start_date: range.start,
        end_date: range.end,
        items,
        summary,
    }
}
