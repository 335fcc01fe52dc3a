//! Reporting periods
//!
//! Periods follow the restaurant's operating cycles (week, biweek, month,
//! quarter). Boundaries are always derived from "today" as supplied by the
//! caller; nothing about a period is stored.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::ledger::DateRange;
use crate::utils::time::{
    days_inclusive, first_of_month, first_of_quarter, last_of_month, last_of_quarter, quarter_of,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Week,
    Biweek,
    Month,
    Quarter,
    /// Explicit caller-supplied range
    Custom,
}

impl PeriodType {
    /// Permissive parse: anything unrecognized resolves to [`PeriodType::Week`]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Self::Week,
            "biweek" | "biweekly" => Self::Biweek,
            "month" | "monthly" => Self::Month,
            "quarter" | "quarterly" => Self::Quarter,
            other => {
                tracing::debug!(period = other, "Unknown period type, using week");
                Self::Week
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Biweek => "biweek",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for PeriodType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved reporting period (inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    #[serde(rename = "type")]
    pub kind: PeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub label: String,
    pub day_count: i64,
}

impl Period {
    fn new(kind: PeriodType, start_date: NaiveDate, end_date: NaiveDate, label: String) -> Self {
        Self {
            kind,
            start_date,
            end_date,
            label,
            day_count: days_inclusive(start_date, end_date),
        }
    }

    /// Caller-defined range; callers validate start <= end first
    pub fn custom(start_date: NaiveDate, end_date: NaiveDate, label: impl Into<String>) -> Self {
        Self::new(PeriodType::Custom, start_date, end_date, label.into())
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Computes period boundaries relative to a given "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodResolver {
    /// 0 = Sunday … 6 = Saturday
    week_start_day: u32,
    /// First day the tenant has data; a week starting earlier is shortened
    tracking_since: Option<NaiveDate>,
}

impl PeriodResolver {
    pub fn new(week_start_day: u32) -> Self {
        Self {
            week_start_day: week_start_day % 7,
            tracking_since: None,
        }
    }

    pub fn with_tracking_since(mut self, date: NaiveDate) -> Self {
        self.tracking_since = Some(date);
        self
    }

    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        let offset = (date.weekday().num_days_from_sunday() + 7 - self.week_start_day) % 7;
        date - Duration::days(offset as i64)
    }

    /// The period of `kind` containing `today`
    pub fn resolve_current(&self, kind: PeriodType, today: NaiveDate) -> Period {
        match kind {
            PeriodType::Week | PeriodType::Custom => self.current_week(today),
            PeriodType::Biweek => {
                let start = self.start_of_week(today);
                let end = (start + Duration::days(13)).min(today);
                Period::new(kind, start, end, biweek_label(start, end))
            }
            PeriodType::Month => {
                let start = first_of_month(today);
                let end = last_of_month(today);
                Period::new(kind, start, end, month_label(start, end))
            }
            PeriodType::Quarter => {
                let start = first_of_quarter(today);
                let end = last_of_quarter(today);
                Period::new(kind, start, end, quarter_label(start, end))
            }
        }
    }

    /// The period of `kind` immediately before the current one
    pub fn resolve_previous(&self, kind: PeriodType, today: NaiveDate) -> Period {
        match kind {
            PeriodType::Week | PeriodType::Custom => {
                let start = self.start_of_week(today) - Duration::days(7);
                Period::new(PeriodType::Week, start, start + Duration::days(6), "Last Week".into())
            }
            PeriodType::Biweek => {
                let current_start = self.start_of_week(today);
                let start = current_start - Duration::days(14);
                let end = current_start - Duration::days(1);
                Period::new(kind, start, end, "Previous Biweek".into())
            }
            PeriodType::Month => {
                let this_month = first_of_month(today);
                let start = this_month
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(this_month);
                let end = last_of_month(start);
                Period::new(kind, start, end, month_label(start, end))
            }
            PeriodType::Quarter => {
                let this_quarter = first_of_quarter(today);
                let start = this_quarter
                    .checked_sub_months(Months::new(3))
                    .unwrap_or(this_quarter);
                let end = last_of_quarter(start);
                Period::new(kind, start, end, quarter_label(start, end))
            }
        }
    }

    fn current_week(&self, today: NaiveDate) -> Period {
        let start = self.start_of_week(today);
        let end = start + Duration::days(6);

        // Tenant started tracking mid-week: report only the days that exist
        if let Some(since) = self.tracking_since
            && since > start
            && since <= today
        {
            let days = days_inclusive(since, today);
            let label = if days == 1 {
                "Today".to_string()
            } else {
                format!("Last {} Days", days)
            };
            return Period::new(PeriodType::Week, since, today, label);
        }

        Period::new(PeriodType::Week, start, end, "This Week".into())
    }
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new(0)
    }
}

fn biweek_label(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "Biweekly ({}–{})",
        start.format("%b %-d"),
        end.format("%b %-d, %Y")
    )
}

fn month_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} ({} days)", start.format("%B %Y"), days_inclusive(start, end))
}

fn quarter_label(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "Q{} {} ({}–{})",
        quarter_of(start),
        start.year(),
        start.format("%b %-d"),
        end.format("%b %-d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_is_always_seven_days() {
        let resolver = PeriodResolver::new(0);
        let mut today = d(2025, 2, 20);
        for _ in 0..21 {
            let period = resolver.resolve_current(PeriodType::Week, today);
            assert_eq!(period.day_count, 7, "on {today}");
            assert_eq!(period.label, "This Week");
            assert!(period.start_date <= today && today <= period.end_date);
            today = today.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_week_start_day() {
        // 2025-03-05 is a Wednesday
        let wed = d(2025, 3, 5);
        assert_eq!(PeriodResolver::new(0).start_of_week(wed), d(2025, 3, 2));
        assert_eq!(PeriodResolver::new(1).start_of_week(wed), d(2025, 3, 3));
        assert_eq!(PeriodResolver::new(3).start_of_week(wed), wed);
        // Sunday with a Monday start belongs to the previous week
        assert_eq!(PeriodResolver::new(1).start_of_week(d(2025, 3, 9)), d(2025, 3, 3));
    }

    #[test]
    fn test_partial_first_week() {
        let resolver = PeriodResolver::new(0).with_tracking_since(d(2025, 3, 4));
        let period = resolver.resolve_current(PeriodType::Week, d(2025, 3, 6));
        assert_eq!(period.start_date, d(2025, 3, 4));
        assert_eq!(period.end_date, d(2025, 3, 6));
        assert_eq!(period.day_count, 3);
        assert_eq!(period.label, "Last 3 Days");

        let period = resolver.resolve_current(PeriodType::Week, d(2025, 3, 4));
        assert_eq!(period.label, "Today");
        assert_eq!(period.day_count, 1);
    }

    #[test]
    fn test_tracking_before_week_uses_full_week() {
        let resolver = PeriodResolver::new(0).with_tracking_since(d(2024, 1, 1));
        let period = resolver.resolve_current(PeriodType::Week, d(2025, 3, 6));
        assert_eq!(period.label, "This Week");
        assert_eq!(period.day_count, 7);
    }

    #[test]
    fn test_biweek_is_clamped_to_today() {
        let resolver = PeriodResolver::new(0);
        let period = resolver.resolve_current(PeriodType::Biweek, d(2025, 3, 5));
        assert_eq!(period.start_date, d(2025, 3, 2));
        assert_eq!(period.end_date, d(2025, 3, 5));
        assert_eq!(period.day_count, 4);
        assert_eq!(period.label, "Biweekly (Mar 2–Mar 5, 2025)");
    }

    #[test]
    fn test_month_and_quarter() {
        let resolver = PeriodResolver::new(0);
        let month = resolver.resolve_current(PeriodType::Month, d(2024, 2, 10));
        assert_eq!(month.start_date, d(2024, 2, 1));
        assert_eq!(month.end_date, d(2024, 2, 29));
        assert_eq!(month.label, "February 2024 (29 days)");

        let quarter = resolver.resolve_current(PeriodType::Quarter, d(2025, 8, 15));
        assert_eq!(quarter.start_date, d(2025, 7, 1));
        assert_eq!(quarter.end_date, d(2025, 9, 30));
        assert_eq!(quarter.day_count, 92);
        assert_eq!(quarter.label, "Q3 2025 (Jul 1–Sep 30)");
    }

    #[test]
    fn test_previous_periods() {
        let resolver = PeriodResolver::new(0);
        let today = d(2025, 1, 15);

        let week = resolver.resolve_previous(PeriodType::Week, today);
        assert_eq!(week.start_date, d(2025, 1, 5));
        assert_eq!(week.end_date, d(2025, 1, 11));
        assert_eq!(week.label, "Last Week");

        let biweek = resolver.resolve_previous(PeriodType::Biweek, today);
        assert_eq!(biweek.start_date, d(2024, 12, 29));
        assert_eq!(biweek.end_date, d(2025, 1, 11));
        assert_eq!(biweek.day_count, 14);

        let month = resolver.resolve_previous(PeriodType::Month, today);
        assert_eq!(month.start_date, d(2024, 12, 1));
        assert_eq!(month.end_date, d(2024, 12, 31));

        let quarter = resolver.resolve_previous(PeriodType::Quarter, today);
        assert_eq!(quarter.start_date, d(2024, 10, 1));
        assert_eq!(quarter.end_date, d(2024, 12, 31));
        assert_eq!(quarter.label, "Q4 2024 (Oct 1–Dec 31)");
    }

    #[test]
    fn test_unknown_type_falls_back_to_week() {
        assert_eq!(PeriodType::parse("fortnight"), PeriodType::Week);
        assert_eq!(PeriodType::parse("  Monthly "), PeriodType::Month);
        assert_eq!("quarterly".parse::<PeriodType>(), Ok(PeriodType::Quarter));
        assert_eq!(PeriodType::parse("custom"), PeriodType::Week);
    }

    #[test]
    fn test_period_serializes_type_field() {
        let period = Period::custom(d(2025, 3, 1), d(2025, 3, 10), "Custom");
        let json = serde_json::to_value(&period).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["start_date"], "2025-03-01");
        assert_eq!(json["day_count"], 10);
    }
}
