//! Period profit & loss
//!
//! Every percentage is guarded: a zero (or negative) denominator yields 0,
//! never NaN or Infinity. Values stay exact until serialization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::aggregator::{CostAggregator, CostTotals};
use super::cache::{AnalyticsCache, CacheKey};
use super::period::{Period, PeriodResolver, PeriodType};
use crate::core::AnalyticsConfig;
use crate::utils::AppResult;
use crate::utils::money::{format_currency, percent_of, serialize_money, to_decimal};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    #[serde(serialize_with = "serialize_money")]
    pub purchases: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub labor: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste: Decimal,
}

/// Independent, non-exclusive warning flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CrisisIndicators {
    pub prime_cost_alert: bool,
    pub food_cost_alert: bool,
    pub waste_alert: bool,
    pub negative_cash_flow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnRate {
    #[serde(serialize_with = "serialize_money")]
    pub value: Decimal,
    pub label: String,
    pub tooltip: String,
    pub period_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitLossResult {
    pub period: Period,
    #[serde(serialize_with = "serialize_money")]
    pub sales: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_cost: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub gross_profit: Decimal,
    pub is_profitable: bool,
    #[serde(serialize_with = "serialize_money")]
    pub food_cost_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub labor_cost_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub prime_cost_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste_percent: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub waste_percent_of_food_cost: Decimal,
    pub daily_burn_rate: BurnRate,
    pub costs: CostBreakdown,
    pub crisis_indicators: CrisisIndicators,
}

impl ProfitLossResult {
    /// Derive the P&L from period totals
    pub fn from_totals(period: Period, totals: &CostTotals, config: &AnalyticsConfig) -> Self {
        let CostTotals {
            sales,
            purchases,
            waste,
            labor,
        } = *totals;

        let total_cost = purchases + labor + waste;
        let gross_profit = sales - total_cost;

        let food_cost_percent = percent_of(purchases, sales);
        let labor_cost_percent = percent_of(labor, sales);
        let prime_cost_percent = food_cost_percent + labor_cost_percent;
        let waste_percent = percent_of(waste, sales);
        let waste_percent_of_food_cost = percent_of(waste, purchases);

        let daily_burn_rate = burn_rate(gross_profit, period.day_count);

        let alerts = &config.alerts;
        let crisis_indicators = CrisisIndicators {
            prime_cost_alert: prime_cost_percent > to_decimal(alerts.prime_cost_percent),
            food_cost_alert: food_cost_percent > to_decimal(alerts.food_cost_percent),
            waste_alert: waste_percent_of_food_cost
                > to_decimal(alerts.waste_of_food_cost_percent),
            negative_cash_flow: daily_burn_rate.value < Decimal::ZERO,
        };

        Self {
            period,
            sales,
            total_cost,
            gross_profit,
            is_profitable: gross_profit > Decimal::ZERO,
            food_cost_percent,
            labor_cost_percent,
            prime_cost_percent,
            waste_percent,
            waste_percent_of_food_cost,
            daily_burn_rate,
            costs: CostBreakdown {
                purchases,
                labor,
                waste,
            },
            crisis_indicators,
        }
    }

    pub fn is_loss(&self) -> bool {
        self.gross_profit < Decimal::ZERO
    }
}

fn burn_rate(gross_profit: Decimal, day_count: i64) -> BurnRate {
    let value = if day_count > 0 {
        gross_profit / Decimal::from(day_count)
    } else {
        Decimal::ZERO
    };
    let (label, kind) = if value >= Decimal::ZERO {
        ("Daily profit", "Profit")
    } else {
        ("Daily burn rate", "Loss")
    };
    BurnRate {
        value,
        label: label.to_string(),
        tooltip: format!(
            "{} {} ÷ {} days = {}/day",
            kind,
            format_currency(gross_profit.abs()),
            day_count,
            format_currency(value.abs())
        ),
        period_days: day_count,
    }
}

/// Headline metrics of a previous period, for "vs last period" comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodMetrics {
    pub period: Period,
    #[serde(serialize_with = "serialize_money")]
    pub sales: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub gross_profit: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub food_cost_percent: Decimal,
}

impl From<&ProfitLossResult> for PeriodMetrics {
    fn from(pl: &ProfitLossResult) -> Self {
        Self {
            period: pl.period.clone(),
            sales: pl.sales,
            gross_profit: pl.gross_profit,
            food_cost_percent: pl.food_cost_percent,
        }
    }
}

/// Resolves periods, aggregates, and derives the P&L (optionally cached)
#[derive(Clone)]
pub struct ProfitLossCalculator {
    aggregator: CostAggregator,
    resolver: PeriodResolver,
    config: Arc<AnalyticsConfig>,
    cache: Option<(Arc<dyn AnalyticsCache<ProfitLossResult>>, Duration)>,
}

impl ProfitLossCalculator {
    pub fn new(aggregator: CostAggregator, resolver: PeriodResolver, config: Arc<AnalyticsConfig>) -> Self {
        Self {
            aggregator,
            resolver,
            config,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn AnalyticsCache<ProfitLossResult>>, ttl: Duration) -> Self {
        self.cache = Some((cache, ttl));
        self
    }

    /// Shorten the current week for tenants that started tracking mid-week
    pub fn with_tracking_since(mut self, date: NaiveDate) -> Self {
        self.resolver = self.resolver.with_tracking_since(date);
        self
    }

    /// P&L for the current period of `kind`
    pub async fn calculate_profit_loss(
        &self,
        tenant_id: &str,
        kind: PeriodType,
        today: NaiveDate,
    ) -> AppResult<ProfitLossResult> {
        let period = self.resolver.resolve_current(kind, today);
        self.calculate_for_period(tenant_id, period).await
    }

    /// P&L for an explicit period (read-through cache keyed by tenant + period)
    pub async fn calculate_for_period(&self, tenant_id: &str, period: Period) -> AppResult<ProfitLossResult> {
        let key = CacheKey::profit_loss(tenant_id, &period);
        if let Some((cache, _)) = &self.cache
            && let Some(hit) = cache.get(&key)
        {
            tracing::debug!(tenant_id = %tenant_id, period = %period.label, "P&L cache hit");
            return Ok(hit);
        }

        let totals = self.aggregator.totals(tenant_id, period.range()).await?;
        let result = ProfitLossResult::from_totals(period, &totals, &self.config);

        tracing::debug!(
            tenant_id = %tenant_id,
            period = %result.period.label,
            gross_profit = %result.gross_profit,
            food_cost_percent = %result.food_cost_percent,
            "Calculated P&L"
        );

        if let Some((cache, ttl)) = &self.cache {
            cache.set(key, result.clone(), *ttl);
        }
        Ok(result)
    }

    /// Headline metrics for the period before the current one
    pub async fn previous_period_metrics(
        &self,
        tenant_id: &str,
        kind: PeriodType,
        today: NaiveDate,
    ) -> AppResult<PeriodMetrics> {
        let period = self.resolver.resolve_previous(kind, today);
        let pl = self.calculate_for_period(tenant_id, period).await?;
        Ok(PeriodMetrics::from(&pl))
    }
}
