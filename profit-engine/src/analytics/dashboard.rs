//! Analytics service
//!
//! Composes the period, P&L, confidence, savings, priority and crisis
//! components into the payloads callers consume. No decision logic of its
//! own beyond the executive summary's first-match rules.

use chrono::{Duration as DateDuration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::util::now_millis;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::aggregator::{CostAggregator, CostTotals};
use super::alerts::{ActionItems, AlertFeed, SlowMovingItem, action_items, all_alerts, slow_moving_items};
use super::cache::{AnalyticsCache, CacheKey, CacheStats, TtlCache};
use super::confidence::{MetricDisplay, PrimeCostDisplay, food_cost_display, prime_cost_display, waste_display};
use super::crisis::{CrisisBanner, CrisisBannerEngine, DailySnapshot};
use super::inventory::{InventoryAlerts, inventory_alerts};
use super::margins::{MenuProfitability, ProductMarginReport, menu_profitability, product_margins};
use super::period::{Period, PeriodResolver, PeriodType};
use super::priority::{PrioritySelection, select_priority_action};
use super::profit_loss::{BurnRate, PeriodMetrics, ProfitLossCalculator, ProfitLossResult};
use super::savings::{CATEGORY_FOOD_COST, CATEGORY_WASTE, SavingsBreakdown, SavingsBreakdownBuilder};
use super::suppliers::{SupplierRank, rank_suppliers};
use super::trends::{PeriodFigures, RangeComparison, TrendGranularity, TrendsReport, trend_windows};
use super::variance::{VarianceReport, detect_variance};
use crate::core::{AnalyticsConfig, CacheConfig};
use crate::ledger::{DateRange, LedgerSource};
use crate::utils::AppResult;
use crate::utils::money::{apply_percent, format_currency, format_percent, round_dp, serialize_money, to_decimal};
use crate::utils::time::{Clock, days_in_month, first_of_month, validate_range};

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLoss {
    pub category: String,
    #[serde(serialize_with = "serialize_money")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossSummary {
    #[serde(serialize_with = "serialize_money")]
    pub total_loss: Decimal,
    pub is_loss: bool,
    pub primary_category: Option<String>,
}

/// Current period against the one before it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub previous: PeriodMetrics,
    #[serde(serialize_with = "serialize_money")]
    pub sales_change: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub gross_profit_change: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub food_cost_percent_change: Decimal,
}

impl PeriodComparison {
    pub fn new(current: &ProfitLossResult, previous: PeriodMetrics) -> Self {
        Self {
            sales_change: current.sales - previous.sales,
            gross_profit_change: current.gross_profit - previous.gross_profit,
            food_cost_percent_change: current.food_cost_percent - previous.food_cost_percent,
            previous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPayload {
    pub period: Period,
    pub profit_loss: ProfitLossResult,
    pub priority: PrioritySelection,
    pub savings_breakdown: SavingsBreakdown,
    pub food_cost_display: MetricDisplay,
    pub waste_display: MetricDisplay,
    pub prime_cost_display: PrimeCostDisplay,
    pub loss_by_category: Vec<CategoryLoss>,
    pub loss_summary: LossSummary,
    pub comparison: Option<PeriodComparison>,
    pub generated_at: i64,
}

impl DashboardPayload {
    /// All-zero payload for callers substituting a failed computation
    pub fn zeroed(period: Period) -> Self {
        let config = AnalyticsConfig::default();
        let profit_loss = ProfitLossResult::from_totals(period.clone(), &CostTotals::default(), &config);
        Self::compose(profit_loss, SavingsBreakdown::zeroed(period), None, &config)
    }

    fn compose(
        profit_loss: ProfitLossResult,
        savings_breakdown: SavingsBreakdown,
        comparison: Option<PeriodComparison>,
        config: &AnalyticsConfig,
    ) -> Self {
        let costs = &profit_loss.costs;
        let food = food_cost_display(costs.purchases, profit_loss.sales, costs.waste, &config.estimate);
        let waste = waste_display(costs.waste, profit_loss.sales);
        let prime = prime_cost_display(&food, profit_loss.labor_cost_percent);
        let priority = select_priority_action(&profit_loss, &config.targets);
        let loss_by_category = loss_by_category(&savings_breakdown);
        let loss_summary = LossSummary {
            total_loss: savings_breakdown.total_potential_savings,
            is_loss: savings_breakdown.is_loss,
            primary_category: loss_by_category.first().map(|c| c.category.clone()),
        };

        Self {
            period: profit_loss.period.clone(),
            profit_loss,
            priority,
            savings_breakdown,
            food_cost_display: food,
            waste_display: waste,
            prime_cost_display: prime,
            loss_by_category,
            loss_summary,
            comparison,
            generated_at: now_millis(),
        }
    }
}

/// Σ |impact| per savings category, largest first
pub fn loss_by_category(breakdown: &SavingsBreakdown) -> Vec<CategoryLoss> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for item in &breakdown.items {
        *totals.entry(item.category.as_str()).or_default() += item.monthly_impact.abs();
    }
    let mut list: Vec<CategoryLoss> = totals
        .into_iter()
        .map(|(category, amount)| CategoryLoss {
            category: category.to_string(),
            amount,
        })
        .collect();
    list.sort_by(|a, b| b.amount.cmp(&a.amount));
    list
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityOneRule {
    ReduceWaste,
    AdjustOrdering,
    UseExpiringInventory,
    RestockCritical,
    OnTrack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityOne {
    pub id: PriorityOneRule,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "serialize_money")]
    pub potential_savings: Decimal,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPl {
    #[serde(serialize_with = "serialize_money")]
    pub value: Decimal,
    pub is_loss: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCostDriver {
    pub name: String,
    #[serde(serialize_with = "serialize_money")]
    pub value: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodCostVsGoal {
    #[serde(serialize_with = "serialize_money")]
    pub current: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub goal: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub delta: Decimal,
    pub over_goal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub daily_burn_rate: BurnRate,
    pub projected_monthly_pl: ProjectedPl,
    pub top_cost_driver: TopCostDriver,
    pub food_cost_vs_goal: FoodCostVsGoal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub crisis_banner: CrisisBanner,
    pub priority_one: PriorityOne,
    pub cards: SummaryCards,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(serialize_with = "serialize_money")]
    pub total_spend: Decimal,
    pub suppliers: Vec<SupplierRank>,
}

// ============================================================================
// Executive summary rules
// ============================================================================

/// First matching rule wins
pub fn select_priority_one(
    dashboard: &DashboardPayload,
    inventory: &InventoryAlerts,
    config: &AnalyticsConfig,
) -> PriorityOne {
    let pl = &dashboard.profit_loss;
    let waste = pl.costs.waste;

    let impact_of = |category: &str| -> Decimal {
        dashboard
            .savings_breakdown
            .items
            .iter()
            .filter(|i| i.category == category)
            .map(|i| i.monthly_impact)
            .sum()
    };
    let waste_impact = impact_of(CATEGORY_WASTE);
    let food_cost_impact = impact_of(CATEGORY_FOOD_COST);

    let waste_is_largest = waste_impact >= food_cost_impact && waste_impact > Decimal::ZERO;
    if pl.waste_percent > to_decimal(config.targets.waste_percent) && waste_is_largest && waste > Decimal::ZERO {
        return PriorityOne {
            id: PriorityOneRule::ReduceWaste,
            title: "Reduce Waste".into(),
            description: format!("Waste is {} of sales this period.", format_percent(pl.waste_percent)),
            potential_savings: round_dp(waste, 0),
            category: Some(CATEGORY_WASTE.into()),
        };
    }

    let food_target = to_decimal(config.targets.food_cost_percent);
    let overrun = if pl.is_loss() {
        (pl.costs.purchases - apply_percent(pl.sales, food_target)).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    if pl.food_cost_percent > food_target && overrun > Decimal::ZERO && food_cost_impact >= waste_impact {
        return PriorityOne {
            id: PriorityOneRule::AdjustOrdering,
            title: "Adjust Ordering".into(),
            description: format!(
                "Food cost is {} (target {}%).",
                format_percent(pl.food_cost_percent),
                config.targets.food_cost_percent
            ),
            potential_savings: round_dp(overrun, 0),
            category: Some(CATEGORY_FOOD_COST.into()),
        };
    }

    let value_at_risk = inventory.summary.total_value_at_risk;
    if !inventory.expiring.is_empty() && value_at_risk >= to_decimal(config.inventory.value_at_risk_min) {
        return PriorityOne {
            id: PriorityOneRule::UseExpiringInventory,
            title: "Use Expiring Inventory".into(),
            description: format!(
                "{} items ({} value) expire within {} days.",
                inventory.expiring.len(),
                format_currency(value_at_risk),
                config.inventory.expiring_days_ahead
            ),
            potential_savings: round_dp(value_at_risk, 0),
            category: Some("Inventory".into()),
        };
    }

    if !inventory.low_stock.is_empty() {
        return PriorityOne {
            id: PriorityOneRule::RestockCritical,
            title: "Restock Critical Items".into(),
            description: format!("{} items are running low.", inventory.low_stock.len()),
            potential_savings: Decimal::ZERO,
            category: Some("Inventory".into()),
        };
    }

    PriorityOne {
        id: PriorityOneRule::OnTrack,
        title: "You're on track".into(),
        description: "Review detailed metrics below.".into(),
        potential_savings: Decimal::ZERO,
        category: None,
    }
}

pub fn summary_cards(dashboard: &DashboardPayload, today: NaiveDate, config: &AnalyticsConfig) -> SummaryCards {
    let pl = &dashboard.profit_loss;

    let projected = if pl.period.day_count > 0 {
        pl.gross_profit / Decimal::from(pl.period.day_count) * Decimal::from(days_in_month(today))
    } else {
        Decimal::ZERO
    };

    let top_cost_driver = match dashboard.savings_breakdown.items.first() {
        Some(top) => TopCostDriver {
            name: match top.category.as_str() {
                CATEGORY_FOOD_COST => "Food cost overrun".to_string(),
                other => other.to_string(),
            },
            value: top.monthly_impact,
            label: "Top Cost Driver".into(),
        },
        None => TopCostDriver {
            name: "None".into(),
            value: Decimal::ZERO,
            label: "Top Cost Driver".into(),
        },
    };

    let current = dashboard
        .food_cost_display
        .value
        .unwrap_or(pl.food_cost_percent);
    let goal = to_decimal(config.targets.food_cost_percent);
    let delta = if current > Decimal::ZERO {
        round_dp(current - goal, 1)
    } else {
        Decimal::ZERO
    };

    SummaryCards {
        daily_burn_rate: pl.daily_burn_rate.clone(),
        projected_monthly_pl: ProjectedPl {
            value: projected,
            is_loss: pl.is_loss(),
            label: "Projected Monthly P&L".into(),
        },
        top_cost_driver,
        food_cost_vs_goal: FoodCostVsGoal {
            current,
            goal,
            delta,
            over_goal: delta > Decimal::ZERO,
        },
    }
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
struct ServiceCaches {
    profit_loss: Arc<TtlCache<ProfitLossResult>>,
    savings: Arc<TtlCache<SavingsBreakdown>>,
    savings_ttl: Duration,
}

/// Entry point for every analytics payload
#[derive(Clone)]
pub struct AnalyticsService {
    ledger: Arc<dyn LedgerSource>,
    clock: Arc<dyn Clock>,
    config: Arc<AnalyticsConfig>,
    aggregator: CostAggregator,
    calculator: ProfitLossCalculator,
    savings: SavingsBreakdownBuilder,
    crisis: CrisisBannerEngine,
    caches: Option<ServiceCaches>,
}

impl AnalyticsService {
    pub fn new(ledger: Arc<dyn LedgerSource>, clock: Arc<dyn Clock>, config: AnalyticsConfig) -> Self {
        let config = Arc::new(config);
        let aggregator = CostAggregator::new(ledger.clone(), config.labor_rate_percent);
        Self {
            calculator: ProfitLossCalculator::new(
                aggregator.clone(),
                PeriodResolver::new(config.week_start_day),
                config.clone(),
            ),
            savings: SavingsBreakdownBuilder::new(ledger.clone(), config.clone()),
            crisis: CrisisBannerEngine::new(config.crisis.clone()),
            aggregator,
            ledger,
            clock,
            config,
            caches: None,
        }
    }

    /// Front P&L and savings results with TTL caches (no-op when disabled)
    pub fn with_cache(mut self, cache: &CacheConfig) -> Self {
        if !cache.enabled {
            return self;
        }
        let caches = ServiceCaches {
            profit_loss: Arc::new(TtlCache::new(cache.max_size)),
            savings: Arc::new(TtlCache::new(cache.max_size)),
            savings_ttl: Duration::from_millis(cache.analytics_ttl_ms),
        };
        self.calculator = self.calculator.with_cache(
            caches.profit_loss.clone(),
            Duration::from_millis(cache.profit_loss_ttl_ms),
        );
        self.caches = Some(caches);
        self
    }

    /// First day the tenant has data; a current week starting earlier is shortened
    pub fn with_tracking_since(mut self, date: NaiveDate) -> Self {
        self.calculator = self.calculator.with_tracking_since(date);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// P&L for the current period of `kind`
    pub async fn get_profit_loss(&self, tenant_id: &str, kind: PeriodType) -> AppResult<ProfitLossResult> {
        self.calculator
            .calculate_profit_loss(tenant_id, kind, self.today())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_dashboard_metrics(&self, tenant_id: &str, kind: PeriodType) -> AppResult<DashboardPayload> {
        let today = self.today();
        let profit_loss = self.calculator.calculate_profit_loss(tenant_id, kind, today).await?;

        let (savings, previous) = tokio::try_join!(
            self.savings_for(tenant_id, &profit_loss.period, &profit_loss),
            self.calculator.previous_period_metrics(tenant_id, kind, today),
        )?;
        let comparison = PeriodComparison::new(&profit_loss, previous);

        let payload = DashboardPayload::compose(profit_loss, savings, Some(comparison), &self.config);
        tracing::info!(
            tenant_id = %tenant_id,
            period = %payload.period.label,
            gross_profit = %payload.profit_loss.gross_profit,
            savings_items = payload.savings_breakdown.items.len(),
            "Dashboard metrics generated"
        );
        Ok(payload)
    }

    /// Breakdown for an explicit range
    #[instrument(skip(self, label))]
    pub async fn get_savings_breakdown(
        &self,
        tenant_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        label: Option<&str>,
    ) -> AppResult<SavingsBreakdown> {
        validate_range(start, end)?;
        let label = label
            .map(str::to_string)
            .unwrap_or_else(|| format!("{start} to {end}"));
        let period = Period::custom(start, end, label);
        let profit_loss = self.calculator.calculate_for_period(tenant_id, period.clone()).await?;
        self.savings_for(tenant_id, &period, &profit_loss).await
    }

    async fn savings_for(
        &self,
        tenant_id: &str,
        period: &Period,
        profit_loss: &ProfitLossResult,
    ) -> AppResult<SavingsBreakdown> {
        let key = CacheKey::savings(tenant_id, period);
        // P&L 缓存可能先过期, 命中时按当前 P&L 重算总额
        if let Some(caches) = &self.caches
            && let Some(hit) = caches.savings.get(&key)
        {
            return Ok(hit.rebase(profit_loss, &self.config));
        }

        let breakdown = self.savings.build_breakdown(tenant_id, period, profit_loss).await?;
        if let Some(caches) = &self.caches {
            caches.savings.set(key, breakdown.clone(), caches.savings_ttl);
        }
        Ok(breakdown)
    }

    #[instrument(skip(self))]
    pub async fn get_executive_summary(&self, tenant_id: &str) -> AppResult<ExecutiveSummary> {
        let (dashboard, crisis_banner, inventory) = tokio::try_join!(
            self.get_dashboard_metrics(tenant_id, PeriodType::Week),
            self.get_crisis_banner(tenant_id),
            self.get_inventory_alerts(tenant_id),
        )?;

        let priority_one = select_priority_one(&dashboard, &inventory, &self.config);
        let cards = summary_cards(&dashboard, self.today(), &self.config);
        tracing::info!(
            tenant_id = %tenant_id,
            priority = ?priority_one.id,
            banner = ?crisis_banner.rule,
            "Executive summary generated"
        );

        Ok(ExecutiveSummary {
            crisis_banner,
            priority_one,
            cards,
            period: dashboard.period,
        })
    }

    /// Banner over the trailing window ending today
    pub async fn get_crisis_banner(&self, tenant_id: &str) -> AppResult<CrisisBanner> {
        let today = self.today();
        let window = i64::from(self.crisis.window_days().max(1));
        let range = DateRange::new(today - DateDuration::days(window - 1), today);

        let days = self.aggregator.daily_totals(tenant_id, range).await?;
        let snapshots: Vec<DailySnapshot> = days
            .iter()
            .map(|day| DailySnapshot::from_totals(day, self.config.labor_rate_percent))
            .collect();
        Ok(self.crisis.evaluate(&snapshots))
    }

    pub async fn get_inventory_alerts(&self, tenant_id: &str) -> AppResult<InventoryAlerts> {
        let inventory = self.ledger.inventory(tenant_id).await?;
        Ok(inventory_alerts(&inventory, self.today(), &self.config.inventory))
    }

    pub async fn get_variance_report(&self, tenant_id: &str, range: DateRange) -> AppResult<VarianceReport> {
        validate_range(range.start, range.end)?;
        let purchases = self.ledger.purchases(tenant_id, range).await?;
        Ok(VarianceReport::new(
            range,
            detect_variance(&purchases, &self.config.savings),
        ))
    }

    pub async fn get_supplier_ranking(&self, tenant_id: &str, range: DateRange) -> AppResult<SupplierReport> {
        validate_range(range.start, range.end)?;
        let purchases = self.ledger.purchases(tenant_id, range).await?;
        let suppliers = rank_suppliers(&purchases);
        Ok(SupplierReport {
            start_date: range.start,
            end_date: range.end,
            total_spend: suppliers.iter().map(|s| s.total_spend).sum(),
            suppliers,
        })
    }

    pub async fn get_previous_period_metrics(&self, tenant_id: &str, kind: PeriodType) -> AppResult<PeriodMetrics> {
        self.calculator
            .previous_period_metrics(tenant_id, kind, self.today())
            .await
    }

    // ========== Item, trend and alert reports ==========

    pub async fn get_product_margins(&self, tenant_id: &str, range: DateRange) -> AppResult<ProductMarginReport> {
        validate_range(range.start, range.end)?;
        let (sales, purchases) = tokio::try_join!(
            self.ledger.sales(tenant_id, range),
            self.ledger.purchases(tenant_id, range),
        )?;
        Ok(product_margins(&sales, &purchases, range))
    }

    pub async fn get_menu_profitability(&self, tenant_id: &str, range: DateRange) -> AppResult<MenuProfitability> {
        validate_range(range.start, range.end)?;
        let sales = self.ledger.sales(tenant_id, range).await?;
        Ok(menu_profitability(
            &sales,
            range,
            to_decimal(self.config.reports.menu_cost_ratio_percent),
        ))
    }

    /// `periods` windows of `granularity` ending today (configured count when None)
    #[instrument(skip(self))]
    pub async fn get_trends(
        &self,
        tenant_id: &str,
        granularity: TrendGranularity,
        periods: Option<u32>,
    ) -> AppResult<TrendsReport> {
        let count = periods.unwrap_or(self.config.reports.trend_periods).max(1);
        let mut trends = Vec::with_capacity(count as usize);
        for window in trend_windows(granularity, count, self.today()) {
            let totals = self.aggregator.totals(tenant_id, window.range).await?;
            trends.push(PeriodFigures::from_totals(window.label, window.range, &totals));
        }
        Ok(TrendsReport::new(granularity, trends))
    }

    pub async fn compare_periods(
        &self,
        tenant_id: &str,
        first: DateRange,
        second: DateRange,
    ) -> AppResult<RangeComparison> {
        validate_range(first.start, first.end)?;
        validate_range(second.start, second.end)?;
        let (a, b) = tokio::try_join!(
            self.aggregator.totals(tenant_id, first),
            self.aggregator.totals(tenant_id, second),
        )?;
        let figures = |range: DateRange, totals: &CostTotals| {
            PeriodFigures::from_totals(format!("{} to {}", range.start, range.end), range, totals)
        };
        Ok(RangeComparison::new(figures(first, &a), figures(second, &b)))
    }

    /// Last activity is taken from sale and purchase lines inside the lookback window
    pub async fn get_slow_moving_items(&self, tenant_id: &str) -> AppResult<Vec<SlowMovingItem>> {
        let today = self.today();
        let thresholds = &self.config.inventory;
        let range = DateRange::new(
            today - DateDuration::days(thresholds.slow_moving_lookback_days.max(0)),
            today,
        );
        let (inventory, sales, purchases) = tokio::try_join!(
            self.ledger.inventory(tenant_id),
            self.ledger.sales(tenant_id, range),
            self.ledger.purchases(tenant_id, range),
        )?;
        Ok(slow_moving_items(&inventory, &sales, &purchases, today, thresholds))
    }

    /// Month-to-date, the same window the monthly dashboard reads
    pub async fn get_action_items(&self, tenant_id: &str) -> AppResult<ActionItems> {
        let today = self.today();
        let period = Period::custom(first_of_month(today), today, "Month to Date");
        let (profit_loss, inventory) = tokio::try_join!(
            self.calculator.calculate_for_period(tenant_id, period),
            self.ledger.inventory(tenant_id),
        )?;
        let actions = action_items(&profit_loss, &inventory, today, &self.config);
        tracing::debug!(
            tenant_id = %tenant_id,
            count = actions.count,
            high = actions.high_priority,
            "Action items generated"
        );
        Ok(actions)
    }

    pub async fn get_all_alerts(&self, tenant_id: &str) -> AppResult<AlertFeed> {
        let inventory = self.ledger.inventory(tenant_id).await?;
        Ok(all_alerts(&inventory, self.today(), &self.config.inventory))
    }

    // ========== Cache administration ==========

    pub fn clean_expired_caches(&self) -> usize {
        self.caches
            .as_ref()
            .map(|c| c.profit_loss.clean_expired() + c.savings.clean_expired())
            .unwrap_or(0)
    }

    /// Explicit flush only; ledger writes never call this
    pub fn invalidate_tenant(&self, tenant_id: &str) -> usize {
        self.caches
            .as_ref()
            .map(|c| c.profit_loss.invalidate_tenant(tenant_id) + c.savings.invalidate_tenant(tenant_id))
            .unwrap_or(0)
    }

    /// (P&L cache, savings cache)
    pub fn cache_stats(&self) -> Option<(CacheStats, CacheStats)> {
        self.caches
            .as_ref()
            .map(|c| (c.profit_loss.stats(), c.savings.stats()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::inventory::InventoryAlertSummary;
    use crate::analytics::savings::{Priority, SavingsItem};

    fn week() -> Period {
        PeriodResolver::new(0).resolve_current(PeriodType::Week, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
    }

    fn dashboard(sales: i64, purchases: i64, waste: i64, items: Vec<SavingsItem>) -> DashboardPayload {
        let config = AnalyticsConfig::default();
        let sales = Decimal::from(sales);
        let totals = CostTotals {
            sales,
            purchases: Decimal::from(purchases),
            waste: Decimal::from(waste),
            labor: sales * Decimal::new(328, 1) / Decimal::ONE_HUNDRED,
        };
        let pl = ProfitLossResult::from_totals(week(), &totals, &config);
        let breakdown = SavingsBreakdown::assemble(week(), &pl, items);
        DashboardPayload::compose(pl, breakdown, None, &config)
    }

    fn item(category: &str, impact: i64) -> SavingsItem {
        SavingsItem {
            id: category.to_uppercase(),
            category: category.into(),
            issue: String::new(),
            monthly_impact: Decimal::from(impact),
            priority: Priority::Low,
            recommendation: String::new(),
            action_items: Vec::new(),
        }
    }

    fn no_inventory() -> InventoryAlerts {
        InventoryAlerts {
            expiring: Vec::new(),
            low_stock: Vec::new(),
            summary: InventoryAlertSummary::default(),
        }
    }

    #[test]
    fn test_zeroed_payload() {
        let payload = DashboardPayload::zeroed(week());
        assert_eq!(payload.profit_loss.sales, Decimal::ZERO);
        assert!(payload.savings_breakdown.items.is_empty());
        assert!(payload.priority.action.is_on_track());
        assert_eq!(payload.food_cost_display.value, None);
        assert!(!payload.loss_summary.is_loss);
        assert!(payload.comparison.is_none());
    }

    #[test]
    fn test_loss_by_category() {
        let payload = dashboard(
            1000,
            1400,
            100,
            vec![item("Waste", 60), item("Variance", 80), item("Waste", 40)],
        );
        let categories: Vec<_> = payload
            .loss_by_category
            .iter()
            .map(|c| (c.category.as_str(), c.amount))
            .collect();
        assert_eq!(
            categories,
            vec![("Waste", Decimal::from(100)), ("Variance", Decimal::from(80))]
        );
        assert_eq!(payload.loss_summary.primary_category.as_deref(), Some("Waste"));
        assert!(payload.loss_summary.is_loss);
    }

    #[test]
    fn test_priority_one_reduce_waste() {
        // waste 8% of sales and the biggest item
        let payload = dashboard(10000, 2900, 800, vec![item("Waste", 800), item("Food Cost", 100)]);
        let p1 = select_priority_one(&payload, &no_inventory(), &AnalyticsConfig::default());
        assert_eq!(p1.id, PriorityOneRule::ReduceWaste);
        assert_eq!(p1.potential_savings, Decimal::from(800));
    }

    #[test]
    fn test_priority_one_adjust_ordering() {
        // loss period, purchases 7000 vs expected 2800
        let payload = dashboard(10000, 7000, 100, vec![item("Food Cost", 4200), item("Waste", 100)]);
        assert!(payload.profit_loss.is_loss());
        let p1 = select_priority_one(&payload, &no_inventory(), &AnalyticsConfig::default());
        assert_eq!(p1.id, PriorityOneRule::AdjustOrdering);
        assert_eq!(p1.potential_savings, Decimal::from(4200));
        assert_eq!(p1.description, "Food cost is 70.0% (target 28%).");
    }

    #[test]
    fn test_priority_one_adjust_ordering_compares_item_impacts() {
        // overrun 3100 - 2800 = 300 sits below the waste items (500),
        // the food cost item (600) does not
        let payload = dashboard(10000, 3100, 4000, vec![item("Food Cost", 600), item("Waste", 500)]);
        assert!(payload.profit_loss.is_loss());
        let p1 = select_priority_one(&payload, &no_inventory(), &AnalyticsConfig::default());
        assert_eq!(p1.id, PriorityOneRule::AdjustOrdering);
        assert_eq!(p1.potential_savings, Decimal::from(300));

        let payload = dashboard(10000, 3100, 4000, vec![item("Food Cost", 400), item("Waste", 500)]);
        let p1 = select_priority_one(&payload, &no_inventory(), &AnalyticsConfig::default());
        assert_eq!(p1.id, PriorityOneRule::ReduceWaste);
    }

    #[test]
    fn test_priority_one_on_track() {
        let payload = dashboard(10000, 2500, 0, Vec::new());
        let p1 = select_priority_one(&payload, &no_inventory(), &AnalyticsConfig::default());
        assert_eq!(p1.id, PriorityOneRule::OnTrack);
        assert_eq!(serde_json::to_value(p1.id).unwrap(), "ON_TRACK");
    }

    #[test]
    fn test_summary_cards() {
        let payload = dashboard(10000, 3500, 0, vec![item("Food Cost", 700)]);
        let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let cards = summary_cards(&payload, today, &AnalyticsConfig::default());

        // 3220 profit over 7 days, 31 days in March
        assert_eq!(
            cards.projected_monthly_pl.value,
            Decimal::from(3220) / Decimal::from(7) * Decimal::from(31)
        );
        assert!(!cards.projected_monthly_pl.is_loss);
        assert_eq!(cards.top_cost_driver.name, "Food cost overrun");
        assert_eq!(cards.food_cost_vs_goal.current, Decimal::from(35));
        assert_eq!(cards.food_cost_vs_goal.delta, Decimal::from(7));
        assert!(cards.food_cost_vs_goal.over_goal);
    }
}
