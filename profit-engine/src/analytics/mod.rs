//! Profitability analytics
//!
//! - [`period`]: reporting period resolution
//! - [`aggregator`]: ledger sums and labor estimate
//! - [`profit_loss`]: period P&L and crisis indicators
//! - [`confidence`]: confidence-graded displays
//! - [`savings`]: ranked savings breakdown
//! - [`priority`]: single priority action
//! - [`crisis`]: trailing-window crisis banner
//! - [`margins`]: product margins and menu profitability
//! - [`trends`]: multi-period trends and range comparison
//! - [`alerts`]: stock and month-to-date alerts
//! - [`dashboard`]: [`AnalyticsService`], the entry point

pub mod aggregator;
pub mod alerts;
pub mod cache;
pub mod confidence;
pub mod crisis;
pub mod dashboard;
pub mod inventory;
pub mod margins;
pub mod period;
pub mod priority;
pub mod profit_loss;
pub mod savings;
pub mod suppliers;
pub mod trends;
pub mod variance;

pub use aggregator::{CostAggregator, CostTotals, DailyTotals};
pub use alerts::{ActionItems, AlertFeed, AlertSeverity, SlowMovingItem};
pub use cache::{AnalyticsCache, CacheKey, CacheStats, TtlCache};
pub use confidence::{Confidence, MetricDisplay, PrimeCostDisplay};
pub use crisis::{BannerSeverity, CrisisBanner, CrisisBannerEngine, CrisisRule, DailySnapshot};
pub use dashboard::{AnalyticsService, DashboardPayload, ExecutiveSummary, PriorityOneRule, SupplierReport};
pub use inventory::InventoryAlerts;
pub use margins::{MenuProfitability, ProductMarginReport};
pub use period::{Period, PeriodResolver, PeriodType};
pub use priority::{Effort, PriorityAction, PrioritySelection};
pub use profit_loss::{PeriodMetrics, ProfitLossCalculator, ProfitLossResult};
pub use savings::{Priority, SavingsBreakdown, SavingsBreakdownBuilder, SavingsItem};
pub use suppliers::SupplierRank;
pub use trends::{PeriodFigures, RangeComparison, TrendGranularity, TrendsReport};
pub use variance::{PriceVariance, Severity, VarianceReport};
