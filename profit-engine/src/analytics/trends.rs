//! Multi-period trends and two-range comparison
//!
//! Profit here is sales − purchases − waste. The labor estimate is a fixed
//! share of sales and would only scale every window by the same factor.

use chrono::{Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregator::CostTotals;
use crate::ledger::DateRange;
use crate::utils::money::{percent_of, serialize_money};
use crate::utils::time::{first_of_month, last_of_month};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendGranularity {
    Weekly,
    Monthly,
}

impl TrendGranularity {
    /// "monthly" / "month"; anything else is weekly
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Self::Monthly,
            _ => Self::Weekly,
        }
    }
}

/// Labelled window of a trend report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendWindow {
    pub label: String,
    pub range: DateRange,
}

/// Oldest first. Weekly windows are trailing 7-day blocks ending on `today`;
/// monthly windows are whole calendar months ending with the current one.
pub fn trend_windows(granularity: TrendGranularity, count: u32, today: NaiveDate) -> Vec<TrendWindow> {
    (0..count)
        .rev()
        .filter_map(|back| match granularity {
            TrendGranularity::Weekly => {
                let end = today - Duration::days(i64::from(back) * 7);
                Some(TrendWindow {
                    label: format!("Week {}", count - back),
                    range: DateRange::new(end - Duration::days(6), end),
                })
            }
            TrendGranularity::Monthly => {
                let start = first_of_month(today).checked_sub_months(Months::new(back))?;
                Some(TrendWindow {
                    label: start.format("%B %Y").to_string(),
                    range: DateRange::new(start, last_of_month(start)),
                })
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodFigures {
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(serialize_with = "serialize_money")]
    pub sales: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub purchases: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub food_cost_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit: Decimal,
}

impl PeriodFigures {
    pub fn from_totals(label: impl Into<String>, range: DateRange, totals: &CostTotals) -> Self {
        Self {
            label: label.into(),
            start_date: range.start,
            end_date: range.end,
            sales: totals.sales,
            purchases: totals.purchases,
            waste: totals.waste,
            food_cost_percent: percent_of(totals.purchases, totals.sales),
            profit: totals.sales - totals.purchases - totals.waste,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendGrowth {
    /// First to last window; 0 when the first window had no sales
    #[serde(serialize_with = "serialize_money")]
    pub sales_growth: Decimal,
    /// Relative to |first profit|; 0 when the first window broke even
    #[serde(serialize_with = "serialize_money")]
    pub profit_growth: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendsReport {
    pub granularity: TrendGranularity,
    pub trends: Vec<PeriodFigures>,
    /// Present with two or more windows
    pub growth: Option<TrendGrowth>,
}

impl TrendsReport {
    pub fn new(granularity: TrendGranularity, trends: Vec<PeriodFigures>) -> Self {
        let growth = match (trends.first(), trends.last()) {
            (Some(first), Some(last)) if trends.len() > 1 => Some(TrendGrowth {
                sales_growth: percent_of(last.sales - first.sales, first.sales),
                profit_growth: percent_of(last.profit - first.profit, first.profit.abs()),
            }),
            _ => None,
        };
        Self {
            granularity,
            trends,
            growth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodChanges {
    #[serde(serialize_with = "serialize_money")]
    pub sales_change: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub purchases_change: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste_change: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit_change: Decimal,
    /// Percentage points, not a relative change
    #[serde(serialize_with = "serialize_money")]
    pub food_cost_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeComparison {
    pub period1: PeriodFigures,
    pub period2: PeriodFigures,
    pub comparison: PeriodChanges,
}

impl RangeComparison {
    /// Percentage changes from `period1` to `period2`; a zero base gives 0
    pub fn new(period1: PeriodFigures, period2: PeriodFigures) -> Self {
        // 亏损基数取绝对值, 持平时按 1 计算
        let profit_base = if period1.profit.is_zero() {
            Decimal::ONE
        } else {
            period1.profit.abs()
        };
        let comparison = PeriodChanges {
            sales_change: percent_of(period2.sales - period1.sales, period1.sales),
            purchases_change: percent_of(period2.purchases - period1.purchases, period1.purchases),
            waste_change: percent_of(period2.waste - period1.waste, period1.waste),
            profit_change: percent_of(period2.profit - period1.profit, profit_base),
            food_cost_change: period2.food_cost_percent - period1.food_cost_percent,
        };
        Self {
            period1,
            period2,
            comparison,
        }
    }
}
