use chrono_tz::Tz;
use std::str::FromStr;

/// 引擎配置 - 所有运行参数
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_PATH | {WORK_DIR}/ledger.db | SQLite 账本文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | LOG_DIR | (无) | 滚动日志目录 |
/// | TIMEZONE | UTC | 业务时区 (IANA) |
/// | WEEK_START_DAY | 0 | 周起始日 (0 = 周日) |
/// | LABOR_RATE_PERCENT | 32.8 | 人工成本估算比例 |
/// | TARGET_FOOD_COST_PERCENT | 28 | 食材成本目标 |
/// | TARGET_LABOR_PERCENT | 30 | 人工成本目标 |
/// | CACHE_ENABLED | true | 是否启用结果缓存 |
/// | CACHE_TTL_MS | 300000 | P&L 缓存 TTL |
/// | CACHE_ANALYTICS_TTL_MS | 600000 | 节省分析缓存 TTL |
/// | CACHE_MAX_SIZE | 100 | 缓存容量 |
/// | EXPIRING_DAYS_AHEAD | 7 | 临期库存范围 (天) |
/// | LOW_STOCK_THRESHOLD | 10 | 低库存阈值 |
/// | SLOW_MOVING_DAYS | 7 | 滞销判定天数 |
/// | MENU_COST_RATIO_PERCENT | 60 | 菜单成本估算比例 |
/// | TREND_PERIODS | 4 | 趋势报表期数 |
///
/// # 示例
///
/// ```ignore
/// TIMEZONE=Europe/Madrid WEEK_START_DAY=1 cargo run -- --tenant t-1
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// SQLite 账本路径
    pub database_path: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// 业务时区，决定 "今天" 的日期
    pub timezone: Tz,
    pub cache: CacheConfig,
    pub analytics: AnalyticsConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{}/ledger.db", work_dir.trim_end_matches('/')));

        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|tz| match tz.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(e) => {
                    tracing::warn!("Invalid TIMEZONE '{}': {}, falling back to UTC", tz, e);
                    None
                }
            })
            .unwrap_or(Tz::UTC);

        let mut analytics = AnalyticsConfig::default();
        analytics.week_start_day = env_or("WEEK_START_DAY", analytics.week_start_day).min(6);
        analytics.labor_rate_percent = env_or("LABOR_RATE_PERCENT", analytics.labor_rate_percent);
        analytics.targets.food_cost_percent =
            env_or("TARGET_FOOD_COST_PERCENT", analytics.targets.food_cost_percent);
        analytics.targets.labor_percent =
            env_or("TARGET_LABOR_PERCENT", analytics.targets.labor_percent);
        analytics.inventory.expiring_days_ahead =
            env_or("EXPIRING_DAYS_AHEAD", analytics.inventory.expiring_days_ahead);
        analytics.inventory.low_stock_threshold =
            env_or("LOW_STOCK_THRESHOLD", analytics.inventory.low_stock_threshold);
        analytics.inventory.slow_moving_days =
            env_or("SLOW_MOVING_DAYS", analytics.inventory.slow_moving_days);
        analytics.reports.menu_cost_ratio_percent =
            env_or("MENU_COST_RATIO_PERCENT", analytics.reports.menu_cost_ratio_percent);
        analytics.reports.trend_periods = env_or("TREND_PERIODS", analytics.reports.trend_periods).max(1);

        Self {
            database_path,
            work_dir,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            timezone,
            cache: CacheConfig {
                enabled: env_or("CACHE_ENABLED", true),
                profit_loss_ttl_ms: env_or("CACHE_TTL_MS", 300_000),
                analytics_ttl_ms: env_or("CACHE_ANALYTICS_TTL_MS", 600_000),
                max_size: env_or("CACHE_MAX_SIZE", 100),
            },
            analytics,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 结果缓存配置
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub profit_loss_ttl_ms: u64,
    pub analytics_ttl_ms: u64,
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            profit_loss_ttl_ms: 300_000,
            analytics_ttl_ms: 600_000,
            max_size: 100,
        }
    }
}

// ============================================================================
// Analytics thresholds
// ============================================================================

/// Every tunable number used by the analytics core, with its default.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// 0 = Sunday … 6 = Saturday
    pub week_start_day: u32,
    /// Labor has no ledger; estimated as this share of sales.
    pub labor_rate_percent: f64,
    pub targets: Targets,
    pub alerts: AlertThresholds,
    pub crisis: CrisisThresholds,
    pub estimate: EstimateHeuristic,
    pub savings: SavingsThresholds,
    pub inventory: InventoryThresholds,
    pub reports: ReportSettings,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            week_start_day: 0,
            labor_rate_percent: 32.8,
            targets: Targets::default(),
            alerts: AlertThresholds::default(),
            crisis: CrisisThresholds::default(),
            estimate: EstimateHeuristic::default(),
            savings: SavingsThresholds::default(),
            inventory: InventoryThresholds::default(),
            reports: ReportSettings::default(),
        }
    }
}

/// Operating targets used to size corrective actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Targets {
    pub food_cost_percent: f64,
    pub labor_percent: f64,
    /// Waste as a share of sales before waste becomes the headline problem.
    pub waste_percent: f64,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            food_cost_percent: 28.0,
            labor_percent: 30.0,
            waste_percent: 5.0,
        }
    }
}

/// Per-period crisis indicator thresholds on the P&L.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    pub prime_cost_percent: f64,
    pub food_cost_percent: f64,
    pub waste_of_food_cost_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            prime_cost_percent: 65.0,
            food_cost_percent: 30.0,
            waste_of_food_cost_percent: 5.0,
        }
    }
}

/// Daily thresholds for the crisis banner.
#[derive(Debug, Clone, PartialEq)]
pub struct CrisisThresholds {
    pub window_days: u32,
    pub streak_days: u32,
    pub prime_cost_critical: f64,
    pub prime_cost_high: f64,
    pub food_cost_high: f64,
    pub waste_high: f64,
}

impl Default for CrisisThresholds {
    fn default() -> Self {
        Self {
            window_days: 7,
            streak_days: 3,
            prime_cost_critical: 100.0,
            prime_cost_high: 68.0,
            food_cost_high: 35.0,
            waste_high: 10.0,
        }
    }
}

/// Low-confidence food cost estimate: baseline + waste% of sales, clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateHeuristic {
    pub baseline_percent: f64,
    pub min_percent: f64,
    pub max_percent: f64,
}

impl Default for EstimateHeuristic {
    fn default() -> Self {
        Self {
            baseline_percent: 30.0,
            min_percent: 15.0,
            max_percent: 45.0,
        }
    }
}

/// Savings item priority bands and price variance cut-offs.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsThresholds {
    pub high_priority_impact: f64,
    pub medium_priority_impact: f64,
    pub variance_min_percent: f64,
    pub variance_medium_percent: f64,
    pub variance_high_percent: f64,
}

impl Default for SavingsThresholds {
    fn default() -> Self {
        Self {
            high_priority_impact: 1000.0,
            medium_priority_impact: 500.0,
            variance_min_percent: 10.0,
            variance_medium_percent: 15.0,
            variance_high_percent: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryThresholds {
    pub expiring_days_ahead: i64,
    pub low_stock_threshold: f64,
    /// Minimum value at risk before expiring stock becomes the priority.
    pub value_at_risk_min: f64,
    /// In-stock items unsold for longer than this are slow moving.
    pub slow_moving_days: i64,
    /// How far back sale and purchase lines are scanned for last activity.
    pub slow_moving_lookback_days: i64,
    /// Slow-moving items expiring within this many days are flagged.
    pub expiring_soon_days: i64,
}

impl Default for InventoryThresholds {
    fn default() -> Self {
        Self {
            expiring_days_ahead: 7,
            low_stock_threshold: 10.0,
            value_at_risk_min: 50.0,
            slow_moving_days: 7,
            slow_moving_lookback_days: 90,
            expiring_soon_days: 3,
        }
    }
}

/// Menu and trend report settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    /// No recipe costs exist; menu cost is estimated as this share of revenue.
    pub menu_cost_ratio_percent: f64,
    /// Windows in a trend report.
    pub trend_periods: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            menu_cost_ratio_percent: 60.0,
            trend_periods: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_defaults() {
        let cfg = AnalyticsConfig::default();
        assert_eq!(cfg.labor_rate_percent, 32.8);
        assert_eq!(cfg.targets.food_cost_percent, 28.0);
        assert_eq!(cfg.crisis.prime_cost_high, 68.0);
        assert_eq!(cfg.crisis.window_days, 7);
        assert_eq!(cfg.estimate.baseline_percent, 30.0);
        assert_eq!(cfg.inventory.low_stock_threshold, 10.0);
        assert_eq!(cfg.inventory.slow_moving_days, 7);
        assert_eq!(cfg.reports.menu_cost_ratio_percent, 60.0);
        assert_eq!(cfg.reports.trend_periods, 4);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("PROFIT_ENGINE_TEST_UNSET_KEY", 42u32), 42);
    }
}
