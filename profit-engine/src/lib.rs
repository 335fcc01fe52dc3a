//! Profit Engine - 餐厅盈利分析引擎
//!
//! # 架构概述
//!
//! 从进货、销售、损耗、库存账本计算周期盈亏、节省机会与危机预警：
//!
//! - **账本** (`ledger`): [`LedgerSource`] trait，SQLite 与内存实现
//! - **数据库** (`db`): SQLite 连接池、迁移、仓储
//! - **分析** (`analytics`): 周期、盈亏、置信度、节省、优先行动、危机横幅、毛利、趋势、库存提醒
//! - **配置** (`core`): 环境变量配置与分析阈值
//!
//! # 模块结构
//!
//! ```text
//! profit-engine/src/
//! ├── core/          # 配置
//! ├── db/            # 连接池与仓储
//! ├── ledger/        # 账本读取接口
//! ├── analytics/     # 分析核心
//! └── utils/         # 日志、时间、金额
//! ```

pub mod analytics;
pub mod core;
pub mod db;
pub mod ledger;
pub mod utils;

// Re-export 公共类型
pub use analytics::{AnalyticsService, DashboardPayload, PeriodType, ProfitLossResult, SavingsBreakdown};
pub use core::{AnalyticsConfig, Config};
pub use db::DbService;
pub use ledger::{DateRange, LedgerSource, MemoryLedger, SqliteLedger};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env, 初始化日志
///
/// 返回加载后的配置
pub fn setup_environment() -> Config {
    if let Err(e) = dotenv::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env: {e}");
    }

    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    tracing::debug!(
        environment = %config.environment,
        timezone = %config.timezone,
        "Environment ready"
    );
    config
}
