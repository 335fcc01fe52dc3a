//! Crisis banner over trailing daily snapshots
//!
//! Rules are checked in fixed order and the first match wins, so at most
//! one banner is ever shown.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregator::DailyTotals;
use crate::core::CrisisThresholds;
use crate::utils::money::{percent_of, serialize_money, to_decimal};

/// One day of activity plus the derived daily ratios
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_money")]
    pub sales: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub purchases: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub food_cost_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub prime_cost: Decimal,
}

impl DailySnapshot {
    /// Ratios are 0 on days without sales
    pub fn from_totals(day: &DailyTotals, labor_rate_percent: f64) -> Self {
        let has_sales = day.sales > Decimal::ZERO;
        let food_cost_percent = percent_of(day.purchases, day.sales);
        let prime_cost = if has_sales {
            food_cost_percent + to_decimal(labor_rate_percent)
        } else {
            Decimal::ZERO
        };
        Self {
            date: day.date,
            sales: day.sales,
            purchases: day.purchases,
            waste: day.waste,
            food_cost_percent,
            waste_percent: percent_of(day.waste, day.sales),
            prime_cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrisisRule {
    NoData,
    #[serde(rename = "PRIME_COST_OVER_100")]
    PrimeCostOver100,
    #[serde(rename = "PRIME_COST_3_DAYS")]
    PrimeCost3Days,
    #[serde(rename = "FOOD_COST_3_DAYS")]
    FoodCost3Days,
    #[serde(rename = "WASTE_3_DAYS")]
    Waste3Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerSeverity {
    Gray,
    Red,
    Amber,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrisisBanner {
    pub visible: bool,
    pub severity: Option<BannerSeverity>,
    pub message: Option<String>,
    pub rule: Option<CrisisRule>,
}

impl CrisisBanner {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            severity: None,
            message: None,
            rule: None,
        }
    }

    fn show(rule: CrisisRule, severity: BannerSeverity, message: String) -> Self {
        Self {
            visible: true,
            severity: Some(severity),
            message: Some(message),
            rule: Some(rule),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrisisBannerEngine {
    thresholds: CrisisThresholds,
}

impl CrisisBannerEngine {
    pub fn new(thresholds: CrisisThresholds) -> Self {
        Self { thresholds }
    }

    pub fn window_days(&self) -> u32 {
        self.thresholds.window_days
    }

    /// Evaluate the trailing window (oldest first). Extra leading days are ignored.
    pub fn evaluate(&self, days: &[DailySnapshot]) -> CrisisBanner {
        let window = self.thresholds.window_days as usize;
        let days = &days[days.len().saturating_sub(window)..];
        let t = &self.thresholds;

        let has_sales = days.iter().any(|d| d.sales > Decimal::ZERO);
        let has_purchases = days.iter().any(|d| d.purchases > Decimal::ZERO);
        if !has_sales || !has_purchases {
            return CrisisBanner::show(
                CrisisRule::NoData,
                BannerSeverity::Gray,
                "Add sales and purchase data to see your financial health.".into(),
            );
        }

        let critical = to_decimal(t.prime_cost_critical);
        if days.iter().any(|d| d.prime_cost > critical) {
            return CrisisBanner::show(
                CrisisRule::PrimeCostOver100,
                BannerSeverity::Red,
                format!(
                    "Prime Cost over {}%: the business is losing money on food + labor.",
                    t.prime_cost_critical
                ),
            );
        }

        let prime_high = to_decimal(t.prime_cost_high);
        if self.has_streak(days, |d| d.prime_cost > prime_high) {
            return CrisisBanner::show(
                CrisisRule::PrimeCost3Days,
                BannerSeverity::Red,
                format!(
                    "Prime Cost has been over {}% for {} days. Immediate action recommended.",
                    t.prime_cost_high, t.streak_days
                ),
            );
        }

        let food_high = to_decimal(t.food_cost_high);
        if self.has_streak(days, |d| d.food_cost_percent > food_high) {
            return CrisisBanner::show(
                CrisisRule::FoodCost3Days,
                BannerSeverity::Amber,
                format!(
                    "Food cost has been over {}% for {} days.",
                    t.food_cost_high, t.streak_days
                ),
            );
        }

        let waste_high = to_decimal(t.waste_high);
        if self.has_streak(days, |d| d.waste_percent > waste_high) {
            return CrisisBanner::show(
                CrisisRule::Waste3Days,
                BannerSeverity::Amber,
                format!("Waste has been over {}% for {} days.", t.waste_high, t.streak_days),
            );
        }

        CrisisBanner::hidden()
    }

    /// Streak counter; any non-matching day resets it
    fn has_streak(&self, days: &[DailySnapshot], predicate: impl Fn(&DailySnapshot) -> bool) -> bool {
        let mut count = 0;
        for day in days {
            if predicate(day) {
                count += 1;
                if count >= self.thresholds.streak_days {
                    return true;
                }
            } else {
                count = 0;
            }
        }
        false
    }
}

impl Default for CrisisBannerEngine {
    fn default() -> Self {
        Self::new(CrisisThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::dates_between;

    const LABOR: f64 = 32.8;

    /// (sales, purchases, waste) per day, oldest first
    fn days(values: &[(i64, i64, i64)]) -> Vec<DailySnapshot> {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = start + chrono::Duration::days(values.len() as i64 - 1);
        dates_between(start, end)
            .zip(values)
            .map(|(date, (s, p, w))| {
                DailySnapshot::from_totals(
                    &DailyTotals {
                        date,
                        sales: Decimal::from(*s),
                        purchases: Decimal::from(*p),
                        waste: Decimal::from(*w),
                    },
                    LABOR,
                )
            })
            .collect()
    }

    fn rule(values: &[(i64, i64, i64)]) -> Option<CrisisRule> {
        CrisisBannerEngine::default().evaluate(&days(values)).rule
    }

    #[test]
    fn test_no_data() {
        let banner = CrisisBannerEngine::default().evaluate(&days(&[(100, 0, 0); 7]));
        assert_eq!(banner.rule, Some(CrisisRule::NoData));
        assert_eq!(banner.severity, Some(BannerSeverity::Gray));
        assert_eq!(rule(&[(0, 0, 0); 7]), Some(CrisisRule::NoData));
    }

    #[test]
    fn test_healthy_week_hides_banner() {
        let banner = CrisisBannerEngine::default().evaluate(&days(&[(1000, 250, 10); 7]));
        assert_eq!(banner, CrisisBanner::hidden());
    }

    #[test]
    fn test_prime_over_100_takes_precedence() {
        // day 4: food 117.2%, prime 150%; also satisfies the food-cost rule
        let mut values = [(1000, 250, 0); 7];
        values[3] = (1000, 1172, 0);
        assert_eq!(rule(&values), Some(CrisisRule::PrimeCostOver100));
    }

    #[test]
    fn test_prime_streak_needs_consecutive_days() {
        // prime 72.8% on days 1, 2, 4, 5: no run of three
        let high = (1000, 400, 0);
        let ok = (1000, 250, 0);
        assert_eq!(rule(&[high, high, ok, high, high, ok, ok]), None);
        assert_eq!(
            rule(&[ok, high, high, high, ok, ok, ok]),
            Some(CrisisRule::PrimeCost3Days)
        );
    }

    #[test]
    fn test_food_cost_streak_is_amber() {
        // food 36%, prime 68.8% would trip the prime rule, so lower labor
        let engine = CrisisBannerEngine::default();
        let snapshots: Vec<_> = days(&[(1000, 360, 0); 3])
            .into_iter()
            .map(|mut d| {
                d.prime_cost = d.food_cost_percent + Decimal::from(20);
                d
            })
            .collect();
        let banner = engine.evaluate(&snapshots);
        assert_eq!(banner.rule, Some(CrisisRule::FoodCost3Days));
        assert_eq!(banner.severity, Some(BannerSeverity::Amber));
    }

    #[test]
    fn test_waste_streak() {
        let ok = (1000, 250, 0);
        let wasteful = (1000, 250, 150);
        assert_eq!(
            rule(&[ok, ok, ok, ok, wasteful, wasteful, wasteful]),
            Some(CrisisRule::Waste3Days)
        );
    }

    #[test]
    fn test_streak_outside_window_ignored() {
        // ten days; the high-prime run sits in the first three only
        let high = (1000, 400, 0);
        let ok = (1000, 250, 0);
        assert_eq!(rule(&[high, high, high, ok, ok, ok, ok, ok, ok, ok]), None);
    }

    #[test]
    fn test_rule_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_value(CrisisRule::PrimeCostOver100).unwrap(),
            "PRIME_COST_OVER_100"
        );
        assert_eq!(serde_json::to_value(CrisisRule::NoData).unwrap(), "NO_DATA");
        assert_eq!(serde_json::to_value(CrisisRule::Waste3Days).unwrap(), "WASTE_3_DAYS");
    }
}
