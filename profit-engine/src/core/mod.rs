//! 核心模块 - 引擎配置
//!
//! - [`Config`] - 运行配置 (环境变量)
//! - [`AnalyticsConfig`] - 分析阈值与目标

pub mod config;

pub use config::{
    AlertThresholds, AnalyticsConfig, CacheConfig, Config, CrisisThresholds, EstimateHeuristic,
    InventoryThresholds, ReportSettings, SavingsThresholds, Targets,
};
