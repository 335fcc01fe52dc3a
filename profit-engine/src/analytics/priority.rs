//! Single highest-leverage corrective action for the period

use rust_decimal::Decimal;
use serde::Serialize;

use super::profit_loss::ProfitLossResult;
use crate::core::Targets;
use crate::utils::money::{apply_percent, format_currency, format_percent, serialize_money, to_decimal};

/// Ordered: cheaper effort wins a tie on impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Effort {
    None,
    Low,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityAction {
    pub id: String,
    pub title: String,
    #[serde(serialize_with = "serialize_money")]
    pub impact: Decimal,
    pub effort: Effort,
    pub issue: String,
    pub steps: Vec<String>,
    pub category: Option<String>,
}

impl PriorityAction {
    pub fn on_track() -> Self {
        Self {
            id: "on-track".into(),
            title: "On track".into(),
            impact: Decimal::ZERO,
            effort: Effort::None,
            issue: "No cost line is over target this period.".into(),
            steps: vec!["Keep logging sales, purchases and waste daily".into()],
            category: None,
        }
    }

    pub fn is_on_track(&self) -> bool {
        self.id == "on-track"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritySelection {
    pub action: PriorityAction,
    /// All candidates, best first
    pub impact_list: Vec<PriorityAction>,
}

pub fn candidates(pl: &ProfitLossResult, targets: &Targets) -> Vec<PriorityAction> {
    let mut list = Vec::with_capacity(3);
    let waste = pl.costs.waste;

    if waste > Decimal::ZERO {
        list.push(PriorityAction {
            id: "waste-001".into(),
            title: "Cut waste".into(),
            impact: waste,
            effort: Effort::Medium,
            issue: format!("{} of food was thrown away this period", format_currency(waste)),
            steps: vec![
                "Rotate stock first in, first out".into(),
                "Adjust prep quantities to recent sales".into(),
                "Log every discarded item with a reason".into(),
            ],
            category: Some("Waste".into()),
        });
    }

    let food_target = to_decimal(targets.food_cost_percent);
    if pl.food_cost_percent > food_target {
        list.push(PriorityAction {
            id: "food-cost-001".into(),
            title: "Lower food cost".into(),
            impact: apply_percent(pl.sales, pl.food_cost_percent - food_target),
            effort: Effort::Hard,
            issue: format!(
                "Food cost is {} against a {}% target",
                format_percent(pl.food_cost_percent),
                targets.food_cost_percent
            ),
            steps: vec![
                "Renegotiate prices on the top five purchased items".into(),
                "Re-cost and reprice low-margin dishes".into(),
                "Tighten portion sizes".into(),
            ],
            category: Some("Food Cost".into()),
        });
    }

    let labor_target = to_decimal(targets.labor_percent);
    if pl.labor_cost_percent > labor_target {
        list.push(PriorityAction {
            id: "labor-001".into(),
            title: "Optimize labor".into(),
            impact: apply_percent(pl.sales, pl.labor_cost_percent - labor_target),
            effort: Effort::Medium,
            issue: format!(
                "Labor is {} against a {}% target",
                format_percent(pl.labor_cost_percent),
                targets.labor_percent
            ),
            steps: vec![
                "Match shift schedules to hourly sales".into(),
                "Cross-train staff to cover slow periods".into(),
            ],
            category: Some("Labor".into()),
        });
    }

    list
}

/// Biggest impact first, lower effort breaks ties; "On track" when nothing is over target
pub fn select_priority_action(pl: &ProfitLossResult, targets: &Targets) -> PrioritySelection {
    let mut impact_list = candidates(pl, targets);
    impact_list.sort_by(|a, b| b.impact.cmp(&a.impact).then(a.effort.cmp(&b.effort)));

    let action = impact_list
        .first()
        .cloned()
        .unwrap_or_else(PriorityAction::on_track);
    PrioritySelection { action, impact_list }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::CostTotals;
    use crate::analytics::period::Period;
    use crate::core::AnalyticsConfig;
    use chrono::NaiveDate;

    fn pl(sales: i64, purchases: i64, waste: i64, labor: i64) -> ProfitLossResult {
        let start = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        let totals = CostTotals {
            sales: Decimal::from(sales),
            purchases: Decimal::from(purchases),
            waste: Decimal::from(waste),
            labor: Decimal::from(labor),
        };
        ProfitLossResult::from_totals(Period::custom(start, end, "Test"), &totals, &AnalyticsConfig::default())
    }

    #[test]
    fn test_on_track_sentinel() {
        let selection = select_priority_action(&pl(10000, 2500, 0, 2500), &Targets::default());
        assert!(selection.action.is_on_track());
        assert_eq!(selection.action.effort, Effort::None);
        assert!(selection.impact_list.is_empty());
    }

    #[test]
    fn test_biggest_impact_wins() {
        // food: (35 - 28)% of 10000 = 700, labor: (33 - 30)% = 300, waste 150
        let selection = select_priority_action(&pl(10000, 3500, 150, 3300), &Targets::default());
        assert_eq!(selection.action.id, "food-cost-001");
        assert_eq!(selection.action.impact, Decimal::from(700));
        let ids: Vec<_> = selection.impact_list.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["food-cost-001", "labor-001", "waste-001"]);
    }

    #[test]
    fn test_tie_prefers_lower_effort() {
        // food overrun 300 (Hard) vs waste 300 (Medium)
        let selection = select_priority_action(&pl(10000, 3100, 300, 2000), &Targets::default());
        assert_eq!(selection.action.id, "waste-001");
        assert_eq!(selection.impact_list[1].id, "food-cost-001");
    }
}
