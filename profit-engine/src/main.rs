//! # Profit Engine CLI
//!
//! Prints one analytics payload as JSON, wrapped in the standard response
//! envelope.
//!
//! ```bash
//! profit-engine --tenant t-1
//! profit-engine --tenant t-1 --report summary
//! profit-engine --tenant t-1 --report savings --start 2025-03-01 --end 2025-03-31
//! profit-engine --tenant t-1 --report dashboard --period month
//! profit-engine --tenant t-1 --report trends --period monthly --periods 6
//! profit-engine --tenant t-1 --report compare --start 2025-02-01 --end 2025-02-28 \
//!     --compare-start 2025-03-01 --compare-end 2025-03-31
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use profit_engine::analytics::TrendGranularity;
use profit_engine::utils::time::{SystemClock, first_of_month, parse_date};
use profit_engine::{
    ApiResponse, AnalyticsService, AppError, AppResult, DateRange, DbService, ErrorCategory,
    ErrorCode, PeriodType, SqliteLedger, setup_environment,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "profit-engine")]
#[command(about = "Restaurant profitability analytics")]
#[command(version)]
struct Args {
    /// Tenant (restaurant) id
    #[arg(short, long, env = "TENANT_ID")]
    tenant: String,

    /// dashboard | summary | savings | crisis | alerts | variance | suppliers | previous
    /// | margins | menu | trends | compare | slow-moving | actions | all-alerts
    #[arg(short, long, default_value = "dashboard")]
    report: String,

    /// week | biweek | month | quarter (anything else means week);
    /// weekly | monthly for trends
    #[arg(short, long, default_value = "week")]
    period: String,

    /// Number of trend windows
    #[arg(long)]
    periods: Option<u32>,

    /// Range start (YYYY-MM-DD) for range reports
    #[arg(long)]
    start: Option<String>,

    /// Range end (YYYY-MM-DD) for range reports
    #[arg(long)]
    end: Option<String>,

    /// Second range start for compare
    #[arg(long)]
    compare_start: Option<String>,

    /// Second range end for compare
    #[arg(long)]
    compare_end: Option<String>,

    /// Label for a custom savings range
    #[arg(long)]
    label: Option<String>,

    /// First day with data; shortens the current week
    #[arg(long)]
    since: Option<String>,

    /// Override DATABASE_PATH
    #[arg(long)]
    db: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    Dashboard,
    Summary,
    Savings,
    Crisis,
    Alerts,
    Variance,
    Suppliers,
    Previous,
    Margins,
    Menu,
    Trends,
    Compare,
    SlowMoving,
    Actions,
    AllAlerts,
}

impl FromStr for Report {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Self::Dashboard),
            "summary" | "executive" => Ok(Self::Summary),
            "savings" => Ok(Self::Savings),
            "crisis" => Ok(Self::Crisis),
            "alerts" | "inventory" => Ok(Self::Alerts),
            "variance" => Ok(Self::Variance),
            "suppliers" => Ok(Self::Suppliers),
            "previous" => Ok(Self::Previous),
            "margins" => Ok(Self::Margins),
            "menu" => Ok(Self::Menu),
            "trends" => Ok(Self::Trends),
            "compare" => Ok(Self::Compare),
            "slow-moving" | "slow" => Ok(Self::SlowMoving),
            "actions" => Ok(Self::Actions),
            "all-alerts" => Ok(Self::AllAlerts),
            other => Err(AppError::with_message(
                ErrorCode::UnknownReport,
                format!("Unknown report type: {other}"),
            )),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    let mut config = setup_environment();
    let args = Args::parse();
    if let Some(db) = &args.db {
        config.database_path = db.clone();
    }

    tracing::info!(tenant_id = %args.tenant, report = %args.report, "Profit engine starting");

    // 2. 打开账本
    let db = DbService::new(&config.database_path)
        .await
        .with_context(|| format!("opening ledger at {}", config.database_path))?;

    // 3. 组装分析服务
    let mut service = AnalyticsService::new(
        Arc::new(SqliteLedger::new(db.pool.clone())),
        Arc::new(SystemClock::new(config.timezone)),
        config.analytics.clone(),
    )
    .with_cache(&config.cache);
    if let Some(since) = &args.since {
        service = service.with_tracking_since(parse_date(since)?);
    }

    // 4. 生成报表
    let result = run(&service, &args).await;
    let status = match &result {
        Ok(_) => 0,
        Err(e) => {
            tracing::error!(code = %e.code, category = e.code.category().name(), error = %e, "Report failed");
            exit_status(e.code)
        }
    };
    let response = ApiResponse::from(result);
    println!("{}", serde_json::to_string_pretty(&response)?);

    db.pool.close().await;
    if !response.is_success() {
        std::process::exit(status);
    }
    Ok(())
}

/// 2 when the request itself is wrong, 1 when the ledger or runtime failed
fn exit_status(code: ErrorCode) -> i32 {
    match code.category() {
        ErrorCategory::General | ErrorCategory::Tenant | ErrorCategory::Analytics => 2,
        ErrorCategory::Ledger | ErrorCategory::System => 1,
    }
}

async fn run(service: &AnalyticsService, args: &Args) -> AppResult<serde_json::Value> {
    let tenant = args.tenant.trim();
    if tenant.is_empty() {
        return Err(AppError::new(ErrorCode::TenantNotSelected));
    }
    let report = Report::from_str(&args.report)?;
    let kind = PeriodType::parse(&args.period);

    match report {
        Report::Dashboard => render(service.get_dashboard_metrics(tenant, kind).await?),
        Report::Summary => render(service.get_executive_summary(tenant).await?),
        Report::Savings => {
            let range = range_or_month(service, args)?;
            render(
                service
                    .get_savings_breakdown(tenant, range.start, range.end, args.label.as_deref())
                    .await?,
            )
        }
        Report::Crisis => render(service.get_crisis_banner(tenant).await?),
        Report::Alerts => render(service.get_inventory_alerts(tenant).await?),
        Report::Variance => {
            let range = range_or_month(service, args)?;
            render(service.get_variance_report(tenant, range).await?)
        }
        Report::Suppliers => {
            let range = range_or_month(service, args)?;
            render(service.get_supplier_ranking(tenant, range).await?)
        }
        Report::Previous => render(service.get_previous_period_metrics(tenant, kind).await?),
        Report::Margins => {
            let range = range_or_month(service, args)?;
            render(service.get_product_margins(tenant, range).await?)
        }
        Report::Menu => {
            let range = range_or_month(service, args)?;
            render(service.get_menu_profitability(tenant, range).await?)
        }
        Report::Trends => render(
            service
                .get_trends(tenant, TrendGranularity::parse(&args.period), args.periods)
                .await?,
        ),
        Report::Compare => {
            let first = range_or_month(service, args)?;
            let (Some(start), Some(end)) = (&args.compare_start, &args.compare_end) else {
                return Err(AppError::validation("compare needs --compare-start and --compare-end"));
            };
            let second = DateRange::new(parse_date(start)?, parse_date(end)?);
            render(service.compare_periods(tenant, first, second).await?)
        }
        Report::SlowMoving => render(service.get_slow_moving_items(tenant).await?),
        Report::Actions => render(service.get_action_items(tenant).await?),
        Report::AllAlerts => render(service.get_all_alerts(tenant).await?),
    }
}

/// --start/--end, defaulting to month-to-date
fn range_or_month(service: &AnalyticsService, args: &Args) -> AppResult<DateRange> {
    let today = service.today();
    let parse = |value: &Option<String>, default: NaiveDate| -> AppResult<NaiveDate> {
        value.as_deref().map(parse_date).unwrap_or(Ok(default))
    };
    Ok(DateRange::new(
        parse(&args.start, first_of_month(today))?,
        parse(&args.end, today)?,
    ))
}

fn render<T: Serialize>(payload: T) -> AppResult<serde_json::Value> {
    serde_json::to_value(payload)
        .map_err(|e| AppError::internal(format!("Failed to serialize report: {e}")))
}
