//! Savings breakdown
//!
//! Three independent detectors (waste by category, food cost overrun, price
//! variance) feed one list, ordered by dollar impact. The headline total is
//! the real P&L loss, not the sum of the items.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{InventorySnapshot, ItemCategory, WasteRecord};
use shared::util::normalize_item_name;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::period::Period;
use super::profit_loss::ProfitLossResult;
use super::variance::{PriceVariance, detect_variance};
use crate::core::{AnalyticsConfig, SavingsThresholds};
use crate::ledger::LedgerSource;
use crate::utils::AppResult;
use crate::utils::money::{apply_percent, format_currency, format_percent, serialize_money, to_decimal};

pub const CATEGORY_WASTE: &str = "Waste";
pub const CATEGORY_FOOD_COST: &str = "Food Cost";
pub const CATEGORY_VARIANCE: &str = "Variance";
const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// High above the high band, Medium above the medium band, else Low
pub fn priority_for(impact: Decimal, thresholds: &SavingsThresholds) -> Priority {
    let impact = impact.abs();
    if impact > to_decimal(thresholds.high_priority_impact) {
        Priority::High
    } else if impact > to_decimal(thresholds.medium_priority_impact) {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsItem {
    pub id: String,
    pub category: String,
    pub issue: String,
    #[serde(serialize_with = "serialize_money")]
    pub monthly_impact: Decimal,
    pub priority: Priority,
    pub recommendation: String,
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SavingsSummary {
    pub waste_issues: usize,
    pub food_cost_issues: usize,
    pub variance_issues: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationStep {
    pub step: u8,
    pub label: String,
    #[serde(serialize_with = "serialize_money")]
    pub amount: Decimal,
    pub explanation: String,
}

/// How the P&L figure behind the headline number was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownCalculation {
    #[serde(serialize_with = "serialize_money")]
    pub sales: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub purchases: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub labor: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_costs: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit_loss: Decimal,
    pub steps: Vec<CalculationStep>,
}

impl BreakdownCalculation {
    pub fn from_profit_loss(pl: &ProfitLossResult) -> Self {
        let c = &pl.costs;
        let step = |step: u8, label: &str, amount: Decimal, explanation: String| CalculationStep {
            step,
            label: label.to_string(),
            amount,
            explanation,
        };
        let outcome = if pl.gross_profit < Decimal::ZERO { "Loss" } else { "Profit" };

        Self {
            sales: pl.sales,
            purchases: c.purchases,
            labor: c.labor,
            waste: c.waste,
            total_costs: pl.total_cost,
            profit_loss: pl.gross_profit,
            steps: vec![
                step(1, "Sales", pl.sales, "Total sales recorded in the period".into()),
                step(2, "Purchases", c.purchases, "Supplier invoices in the period".into()),
                step(
                    3,
                    "Labor (estimated)",
                    c.labor,
                    format!("{} of sales", format_percent(pl.labor_cost_percent)),
                ),
                step(4, "Waste", c.waste, "Recorded waste at cost".into()),
                step(
                    5,
                    "Total costs",
                    pl.total_cost,
                    format!(
                        "{} + {} + {}",
                        format_currency(c.purchases),
                        format_currency(c.labor),
                        format_currency(c.waste)
                    ),
                ),
                step(
                    6,
                    outcome,
                    pl.gross_profit,
                    format!(
                        "{} - {}",
                        format_currency(pl.sales),
                        format_currency(pl.total_cost)
                    ),
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsBreakdown {
    pub period: Period,
    #[serde(serialize_with = "serialize_money")]
    pub total_potential_savings: Decimal,
    pub is_loss: bool,
    pub items: Vec<SavingsItem>,
    pub summary: SavingsSummary,
    pub calculation: Option<BreakdownCalculation>,
}

impl SavingsBreakdown {
    /// Empty breakdown for callers substituting a failed computation
    pub fn zeroed(period: Period) -> Self {
        Self {
            period,
            total_potential_savings: Decimal::ZERO,
            is_loss: false,
            items: Vec::new(),
            summary: SavingsSummary::default(),
            calculation: None,
        }
    }

    /// Combine detector output: stable sort by |impact|, total reconciled to the P&L
    pub fn assemble(period: Period, pl: &ProfitLossResult, mut items: Vec<SavingsItem>) -> Self {
        items.sort_by(|a, b| b.monthly_impact.abs().cmp(&a.monthly_impact.abs()));

        let count = |category: &str| items.iter().filter(|i| i.category == category).count();
        let summary = SavingsSummary {
            waste_issues: count(CATEGORY_WASTE),
            food_cost_issues: count(CATEGORY_FOOD_COST),
            variance_issues: count(CATEGORY_VARIANCE),
        };

        let is_loss = pl.is_loss();
        Self {
            period,
            total_potential_savings: if is_loss { pl.gross_profit.abs() } else { Decimal::ZERO },
            is_loss,
            items,
            summary,
            calculation: Some(BreakdownCalculation::from_profit_loss(pl)),
        }
    }

    /// Re-derive the P&L-dependent parts (food cost item, headline total,
    /// calculation) against a newer P&L; ledger-derived items are kept
    pub fn rebase(self, pl: &ProfitLossResult, config: &AnalyticsConfig) -> Self {
        let mut items: Vec<SavingsItem> = self
            .items
            .into_iter()
            .filter(|i| i.category != CATEGORY_FOOD_COST)
            .collect();
        items.extend(food_cost_overrun(pl, config));
        Self::assemble(self.period, pl, items)
    }
}

// ============================================================================
// Detectors
// ============================================================================

/// Category for each waste record: smallest purchase category ever recorded
/// for the item, then inventory category, then "Unknown". Each record counts once.
pub fn waste_by_category(
    waste: &[WasteRecord],
    categories: &[ItemCategory],
    inventory: &[InventorySnapshot],
    thresholds: &SavingsThresholds,
) -> Vec<SavingsItem> {
    // 名字大小写不同的行合并后再取最小
    let mut purchase_categories: HashMap<String, &str> = HashMap::new();
    for entry in categories {
        let category = entry.category.trim();
        if category.is_empty() {
            continue;
        }
        purchase_categories
            .entry(normalize_item_name(&entry.item_name))
            .and_modify(|c| *c = (*c).min(category))
            .or_insert(category);
    }

    let mut inventory_categories: HashMap<String, &str> = HashMap::new();
    for item in inventory {
        if let Some(category) = item.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            inventory_categories
                .entry(normalize_item_name(&item.item_name))
                .and_modify(|c| *c = (*c).min(category))
                .or_insert(category);
        }
    }

    // category → (total cost, record count)
    let mut groups: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for record in waste {
        let key = normalize_item_name(&record.item_name);
        let category = purchase_categories
            .get(&key)
            .or_else(|| inventory_categories.get(&key))
            .copied()
            .unwrap_or(UNKNOWN_CATEGORY);
        let entry = groups.entry(category).or_insert((Decimal::ZERO, 0));
        entry.0 += to_decimal(record.cost_value);
        entry.1 += 1;
    }

    groups
        .into_iter()
        .filter(|(_, (total, _))| *total > Decimal::ZERO)
        .map(|(category, (total, count))| SavingsItem {
            id: format!("WASTE_{category}"),
            category: CATEGORY_WASTE.to_string(),
            issue: format!("Excessive waste in {category} category"),
            monthly_impact: total,
            priority: priority_for(total, thresholds),
            recommendation: format!(
                "Reduce waste in {category} category. Review {count} items and improve inventory rotation."
            ),
            action_items: vec![
                "Implement FIFO (First In, First Out) inventory rotation".into(),
                "Train staff on proper storage and handling".into(),
                "Review portion sizes and prep procedures".into(),
                "Set up waste tracking alerts".into(),
            ],
        })
        .collect()
}

/// One item when food cost runs over target, sized at excess% × sales
pub fn food_cost_overrun(pl: &ProfitLossResult, config: &AnalyticsConfig) -> Option<SavingsItem> {
    let target = to_decimal(config.targets.food_cost_percent);
    if pl.food_cost_percent <= target {
        return None;
    }

    let excess = pl.food_cost_percent - target;
    let impact = apply_percent(pl.sales, excess);
    Some(SavingsItem {
        id: "FOOD_COST_HIGH".into(),
        category: CATEGORY_FOOD_COST.into(),
        issue: format!(
            "Food cost {} exceeds target of {}%",
            format_percent(pl.food_cost_percent),
            config.targets.food_cost_percent
        ),
        monthly_impact: impact,
        priority: priority_for(impact, &config.savings),
        recommendation: format!(
            "Reduce food cost by {} through better purchasing and pricing strategies.",
            format_percent(excess)
        ),
        action_items: vec![
            "Negotiate better prices with suppliers".into(),
            "Review menu pricing to maintain margins".into(),
            "Identify and replace high-cost items".into(),
            "Optimize portion sizes".into(),
            "Source alternative suppliers for expensive items".into(),
        ],
    })
}

pub fn price_variance_items(variances: &[PriceVariance], thresholds: &SavingsThresholds) -> Vec<SavingsItem> {
    variances
        .iter()
        .map(|v| SavingsItem {
            id: format!("VARIANCE_{}", v.item_name),
            category: CATEGORY_VARIANCE.into(),
            issue: format!(
                "Price for {} varies {} across {} purchases",
                v.item_name,
                format_percent(v.variance_percent),
                v.purchase_count
            ),
            monthly_impact: v.overspend,
            priority: priority_for(v.overspend, thresholds),
            recommendation: format!(
                "Buy {} at the best observed price of {}.",
                v.item_name,
                format_currency(v.min_price)
            ),
            action_items: vec![
                "Compare vendor quotes before each order".into(),
                "Lock in contract pricing for high-volume items".into(),
                "Review invoices against agreed prices".into(),
                "Consolidate orders with the cheapest reliable vendor".into(),
            ],
        })
        .collect()
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Clone)]
pub struct SavingsBreakdownBuilder {
    ledger: Arc<dyn LedgerSource>,
    config: Arc<AnalyticsConfig>,
}

impl SavingsBreakdownBuilder {
    pub fn new(ledger: Arc<dyn LedgerSource>, config: Arc<AnalyticsConfig>) -> Self {
        Self { ledger, config }
    }

    pub async fn build_breakdown(
        &self,
        tenant_id: &str,
        period: &Period,
        pl: &ProfitLossResult,
    ) -> AppResult<SavingsBreakdown> {
        let range = period.range();
        let (waste, purchases, categories, inventory) = tokio::try_join!(
            self.ledger.waste(tenant_id, range),
            self.ledger.purchases(tenant_id, range),
            self.ledger.purchase_categories(tenant_id),
            self.ledger.inventory(tenant_id),
        )?;

        let thresholds = &self.config.savings;
        let mut items = waste_by_category(&waste, &categories, &inventory, thresholds);
        items.extend(food_cost_overrun(pl, &self.config));
        items.extend(price_variance_items(
            &detect_variance(&purchases, thresholds),
            thresholds,
        ));

        let breakdown = SavingsBreakdown::assemble(period.clone(), pl, items);
        tracing::debug!(
            tenant_id = %tenant_id,
            period = %period.label,
            items = breakdown.items.len(),
            total = %breakdown.total_potential_savings,
            "Built savings breakdown"
        );
        Ok(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::CostTotals;
    use crate::analytics::period::PeriodType;
    use crate::analytics::PeriodResolver;
    use crate::ledger::MemoryLedger;
    use chrono::NaiveDate;
    use shared::models::{InventoryItemCreate, PurchaseCreate, WasteCreate};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn week() -> Period {
        PeriodResolver::new(0).resolve_current(PeriodType::Week, d(5))
    }

    fn pl(sales: i64, purchases: i64, waste: i64) -> ProfitLossResult {
        let sales = Decimal::from(sales);
        let totals = CostTotals {
            sales,
            purchases: Decimal::from(purchases),
            waste: Decimal::from(waste),
            labor: sales * Decimal::new(328, 1) / Decimal::ONE_HUNDRED,
        };
        ProfitLossResult::from_totals(week(), &totals, &AnalyticsConfig::default())
    }

    fn item(id: &str, impact: i64) -> SavingsItem {
        SavingsItem {
            id: id.into(),
            category: CATEGORY_WASTE.into(),
            issue: String::new(),
            monthly_impact: Decimal::from(impact),
            priority: Priority::Low,
            recommendation: String::new(),
            action_items: Vec::new(),
        }
    }

    #[test]
    fn test_priority_bands() {
        let t = SavingsThresholds::default();
        assert_eq!(priority_for(Decimal::from(1001), &t), Priority::High);
        assert_eq!(priority_for(Decimal::from(1000), &t), Priority::Medium);
        assert_eq!(priority_for(Decimal::from(700), &t), Priority::Medium);
        assert_eq!(priority_for(Decimal::from(500), &t), Priority::Low);
    }

    #[test]
    fn test_food_cost_overrun_sizing() {
        let result = food_cost_overrun(&pl(10000, 3500, 0), &AnalyticsConfig::default()).unwrap();
        assert_eq!(result.id, "FOOD_COST_HIGH");
        assert_eq!(result.monthly_impact, Decimal::from(700));
        assert_eq!(result.priority, Priority::Medium);
        assert_eq!(result.issue, "Food cost 35.0% exceeds target of 28%");
        assert_eq!(result.action_items.len(), 5);

        assert!(food_cost_overrun(&pl(10000, 2800, 0), &AnalyticsConfig::default()).is_none());
    }

    #[test]
    fn test_assemble_sorts_stably_and_reconciles_total() {
        let loss = pl(1000, 1400, 0);
        let items = vec![item("a", 100), item("b", -300), item("c", 100), item("d", 200)];
        let breakdown = SavingsBreakdown::assemble(week(), &loss, items);

        let ids: Vec<_> = breakdown.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
        assert!(breakdown.is_loss);
        // 1000 - 1400 - 328
        assert_eq!(breakdown.total_potential_savings, Decimal::from(728));
        assert_eq!(breakdown.summary.waste_issues, 4);

        let profit = pl(10000, 2000, 0);
        let breakdown = SavingsBreakdown::assemble(week(), &profit, vec![item("a", 900)]);
        assert!(!breakdown.is_loss);
        assert_eq!(breakdown.total_potential_savings, Decimal::ZERO);
    }

    #[test]
    fn test_rebase_follows_newer_profit_loss() {
        let config = AnalyticsConfig::default();
        let stale = pl(10000, 2000, 0);
        let items = vec![item("WASTE_Produce", 300)];
        let breakdown = SavingsBreakdown::assemble(week(), &stale, items);
        assert!(!breakdown.is_loss);

        let fresh = pl(10000, 9000, 0);
        let rebased = breakdown.rebase(&fresh, &config);
        assert!(rebased.is_loss);
        assert_eq!(rebased.total_potential_savings, fresh.gross_profit.abs());
        assert_eq!(rebased.items[0].id, "FOOD_COST_HIGH");
        assert_eq!(rebased.items[1].id, "WASTE_Produce");
        assert_eq!(rebased.summary.food_cost_issues, 1);
        assert_eq!(rebased.calculation.unwrap().profit_loss, fresh.gross_profit);
    }

    #[test]
    fn test_calculation_steps() {
        let calc = BreakdownCalculation::from_profit_loss(&pl(1000, 1400, 0));
        assert_eq!(calc.steps.len(), 6);
        assert_eq!(calc.steps[5].label, "Loss");
        assert_eq!(calc.profit_loss, Decimal::from(-728));
    }

    #[tokio::test]
    async fn test_waste_category_resolution() {
        let ledger = MemoryLedger::new();
        ledger.add_purchase(
            "t",
            PurchaseCreate::new(d(3), "Sysco", 100.0)
                .with_item("Tomatoes", Some("Produce"), 10.0, 2.0)
                .with_item("tomatoes", Some("Canned"), 10.0, 3.0)
                .with_item("Tomatoes", Some(""), 10.0, 3.0),
        );
        let stock = ledger.add_inventory("t", InventoryItemCreate::new("Salmon", 4.0).with_category("Seafood"));
        let waste = vec![
            ledger.add_waste("t", WasteCreate::new(d(4), "TOMATOES", 40.0)),
            ledger.add_waste("t", WasteCreate::new(d(4), "Salmon", 80.0)),
            ledger.add_waste("t", WasteCreate::new(d(4), "Mystery", 5.0)),
        ];

        let categories = ledger.purchase_categories("t").await.unwrap();
        let items = waste_by_category(&waste, &categories, &[stock], &SavingsThresholds::default());
        let ids: Vec<_> = items.iter().map(|i| (i.id.as_str(), i.monthly_impact)).collect();
        assert_eq!(
            ids,
            vec![
                ("WASTE_Canned", Decimal::from(40)),
                ("WASTE_Seafood", Decimal::from(80)),
                ("WASTE_Unknown", Decimal::from(5)),
            ]
        );
        // each waste dollar counted once
        let total: Decimal = items.iter().map(|i| i.monthly_impact).sum();
        assert_eq!(total, Decimal::from(125));
        assert!(items[0].recommendation.contains("Review 1 items"));
    }

    #[tokio::test]
    async fn test_waste_category_from_purchase_before_period() {
        let ledger = Arc::new(MemoryLedger::new());
        // bought the day before the week opens
        ledger.add_purchase(
            "t",
            PurchaseCreate::new(d(1), "Ocean Fresh", 240.0).with_item("Salmon", Some("Seafood"), 10.0, 24.0),
        );
        ledger.add_waste("t", WasteCreate::new(d(4), "salmon", 48.0));

        let period = Period::custom(d(2), d(8), "Week of Mar 2");
        let builder = SavingsBreakdownBuilder::new(ledger.clone(), Arc::new(AnalyticsConfig::default()));
        let breakdown = builder.build_breakdown("t", &period, &pl(10000, 0, 48)).await.unwrap();

        let waste: Vec<_> = breakdown
            .items
            .iter()
            .filter(|i| i.category == CATEGORY_WASTE)
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(waste, vec!["WASTE_Seafood"]);
    }

    #[tokio::test]
    async fn test_build_breakdown_end_to_end() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.add_purchase("t", PurchaseCreate::new(d(3), "Sysco", 3500.0));
        ledger.add_waste("t", WasteCreate::new(d(4), "Bread", 50.0));

        let builder = SavingsBreakdownBuilder::new(ledger.clone(), Arc::new(AnalyticsConfig::default()));
        let breakdown = builder.build_breakdown("t", &week(), &pl(10000, 3500, 50)).await.unwrap();

        assert_eq!(breakdown.items[0].id, "FOOD_COST_HIGH");
        assert_eq!(breakdown.items[0].monthly_impact, Decimal::from(700));
        assert_eq!(breakdown.items[1].id, "WASTE_Unknown");
        assert_eq!(breakdown.summary.food_cost_issues, 1);

        ledger.fail_reads("inventory");
        assert!(builder.build_breakdown("t", &week(), &pl(10000, 3500, 50)).await.is_err());
    }
}
