//! 时间工具函数: 业务时区与日期计算
//!
//! 分析核心只处理 `NaiveDate`，"今天" 由 [`Clock`] 注入，
//! 以便测试固定日期。

use chrono::{Datelike, Months, NaiveDate};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Source of "today" for period resolution
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the business timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 验证日期区间 start <= end
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::invalid_range(format!(
            "Start date {} is after end date {}",
            start, end
        ))
        .with_detail("start", start.to_string())
        .with_detail("end", end.to_string()));
    }
    Ok(())
}

/// Inclusive day count of [start, end]; 0 when inverted
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

/// Every date in [start, end]
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> i64 {
    days_inclusive(first_of_month(date), last_of_month(date))
}

/// 1-based calendar quarter
pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

pub fn first_of_quarter(date: NaiveDate) -> NaiveDate {
    let month = (quarter_of(date) - 1) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

pub fn last_of_quarter(date: NaiveDate) -> NaiveDate {
    first_of_quarter(date)
        .checked_add_months(Months::new(3))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-02-28").unwrap(), d(2025, 2, 28));
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("28/02/2025").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(d(2025, 1, 1), d(2025, 1, 1)).is_ok());
        let err = validate_range(d(2025, 1, 2), d(2025, 1, 1)).unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::InvalidDateRange);
    }

    #[test]
    fn test_days_inclusive() {
        assert_eq!(days_inclusive(d(2025, 1, 1), d(2025, 1, 1)), 1);
        assert_eq!(days_inclusive(d(2025, 1, 1), d(2025, 1, 7)), 7);
        assert_eq!(days_inclusive(d(2025, 1, 7), d(2025, 1, 1)), 0);
    }

    #[test]
    fn test_dates_between() {
        let days: Vec<_> = dates_between(d(2025, 2, 27), d(2025, 3, 2)).collect();
        assert_eq!(days, vec![d(2025, 2, 27), d(2025, 2, 28), d(2025, 3, 1), d(2025, 3, 2)]);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(last_of_month(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(last_of_month(d(2025, 12, 31)), d(2025, 12, 31));
        assert_eq!(days_in_month(d(2025, 4, 15)), 30);
    }

    #[test]
    fn test_quarter_bounds() {
        assert_eq!(quarter_of(d(2025, 5, 20)), 2);
        assert_eq!(first_of_quarter(d(2025, 5, 20)), d(2025, 4, 1));
        assert_eq!(last_of_quarter(d(2025, 5, 20)), d(2025, 6, 30));
        assert_eq!(last_of_quarter(d(2025, 11, 2)), d(2025, 12, 31));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(d(2025, 3, 3)).today(), d(2025, 3, 3));
    }
}
