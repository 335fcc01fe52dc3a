//! Cost aggregation over the ledgers
//!
//! Labor has no ledger of its own; it is estimated as a fixed share of sales.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::ledger::{DateRange, LedgerSource};
use crate::utils::AppResult;
use crate::utils::money::{apply_percent, sum, to_decimal};
use crate::utils::time::dates_between;

/// Period totals (exact decimals)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostTotals {
    pub sales: Decimal,
    pub purchases: Decimal,
    pub waste: Decimal,
    pub labor: Decimal,
}

/// Totals for a single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub purchases: Decimal,
    pub waste: Decimal,
}

#[derive(Clone)]
pub struct CostAggregator {
    ledger: Arc<dyn LedgerSource>,
    labor_rate_percent: Decimal,
}

impl CostAggregator {
    pub fn new(ledger: Arc<dyn LedgerSource>, labor_rate_percent: f64) -> Self {
        Self {
            ledger,
            labor_rate_percent: to_decimal(labor_rate_percent),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerSource> {
        &self.ledger
    }

    pub async fn sum_purchases(&self, tenant_id: &str, range: DateRange) -> AppResult<Decimal> {
        let purchases = self.ledger.purchases(tenant_id, range).await?;
        Ok(sum(purchases.iter().map(|p| p.total_amount)))
    }

    pub async fn sum_sales(&self, tenant_id: &str, range: DateRange) -> AppResult<Decimal> {
        let sales = self.ledger.sales(tenant_id, range).await?;
        Ok(sum(sales.iter().map(|s| s.total_sales)))
    }

    pub async fn sum_waste(&self, tenant_id: &str, range: DateRange) -> AppResult<Decimal> {
        let waste = self.ledger.waste(tenant_id, range).await?;
        Ok(sum(waste.iter().map(|w| w.cost_value)))
    }

    pub async fn estimate_labor(&self, tenant_id: &str, range: DateRange) -> AppResult<Decimal> {
        let sales = self.sum_sales(tenant_id, range).await?;
        Ok(self.labor_from_sales(sales))
    }

    /// Placeholder estimate: sales × labor rate
    pub fn labor_from_sales(&self, sales: Decimal) -> Decimal {
        apply_percent(sales, self.labor_rate_percent)
    }

    /// All four aggregates. The three ledger reads run concurrently; labor
    /// is derived from the sales sum rather than re-reading sales.
    pub async fn totals(&self, tenant_id: &str, range: DateRange) -> AppResult<CostTotals> {
        let (purchases, sales, waste) = tokio::try_join!(
            self.sum_purchases(tenant_id, range),
            self.sum_sales(tenant_id, range),
            self.sum_waste(tenant_id, range),
        )?;

        let totals = CostTotals {
            sales,
            purchases,
            waste,
            labor: self.labor_from_sales(sales),
        };
        tracing::debug!(
            tenant_id = %tenant_id,
            start = %range.start,
            end = %range.end,
            sales = %totals.sales,
            purchases = %totals.purchases,
            waste = %totals.waste,
            "Aggregated period totals"
        );
        Ok(totals)
    }

    /// One entry per day in `range`, zero-filled for days without records
    pub async fn daily_totals(&self, tenant_id: &str, range: DateRange) -> AppResult<Vec<DailyTotals>> {
        let (purchases, sales, waste) = tokio::try_join!(
            self.ledger.purchases(tenant_id, range),
            self.ledger.sales(tenant_id, range),
            self.ledger.waste(tenant_id, range),
        )?;

        let mut days: BTreeMap<NaiveDate, DailyTotals> = dates_between(range.start, range.end)
            .map(|date| {
                (
                    date,
                    DailyTotals {
                        date,
                        sales: Decimal::ZERO,
                        purchases: Decimal::ZERO,
                        waste: Decimal::ZERO,
                    },
                )
            })
            .collect();

        for p in &purchases {
            if let Some(day) = days.get_mut(&p.purchase_date) {
                day.purchases += to_decimal(p.total_amount);
            }
        }
        for s in &sales {
            if let Some(day) = days.get_mut(&s.sale_date) {
                day.sales += to_decimal(s.total_sales);
            }
        }
        for w in &waste {
            if let Some(day) = days.get_mut(&w.waste_date) {
                day.waste += to_decimal(w.cost_value);
            }
        }

        Ok(days.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use shared::ErrorCode;
    use shared::models::{PurchaseCreate, SaleCreate, WasteCreate};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn week() -> DateRange {
        DateRange::new(d(2), d(8))
    }

    fn seeded() -> Arc<MemoryLedger> {
        let ledger = MemoryLedger::new();
        ledger.add_purchase("t", PurchaseCreate::new(d(3), "Sysco", 1500.0));
        ledger.add_purchase("t", PurchaseCreate::new(d(5), "Sysco", 2000.0));
        ledger.add_purchase("t", PurchaseCreate::new(d(12), "Sysco", 999.0));
        ledger.add_sale("t", SaleCreate::new(d(3), 4000.0));
        ledger.add_sale("t", SaleCreate::new(d(4), 6000.0));
        ledger.add_waste("t", WasteCreate::new(d(4), "Lettuce", 120.25));
        Arc::new(ledger)
    }

    #[tokio::test]
    async fn test_sums() {
        let agg = CostAggregator::new(seeded(), 32.8);
        assert_eq!(agg.sum_purchases("t", week()).await.unwrap(), Decimal::from(3500));
        assert_eq!(agg.sum_sales("t", week()).await.unwrap(), Decimal::from(10000));
        assert_eq!(agg.sum_waste("t", week()).await.unwrap(), Decimal::new(12025, 2));
        assert_eq!(agg.estimate_labor("t", week()).await.unwrap(), Decimal::from(3280));
    }

    #[test]
    fn test_labor_estimate_does_not_overflow() {
        let agg = CostAggregator::new(Arc::new(MemoryLedger::new()), 32.8);
        assert_eq!(agg.labor_from_sales(Decimal::MAX), Decimal::ZERO);
        assert_eq!(agg.labor_from_sales(Decimal::from(1000)), Decimal::from(328));
    }

    #[tokio::test]
    async fn test_empty_range_is_zero() {
        let agg = CostAggregator::new(seeded(), 32.8);
        let totals = agg.totals("nobody", week()).await.unwrap();
        assert_eq!(totals, CostTotals::default());
    }

    #[tokio::test]
    async fn test_daily_totals_zero_fill() {
        let agg = CostAggregator::new(seeded(), 32.8);
        let days = agg.daily_totals("t", week()).await.unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, d(2));
        assert_eq!(days[0].sales, Decimal::ZERO);
        assert_eq!(days[1].purchases, Decimal::from(1500));
        assert_eq!(days[2].waste, Decimal::new(12025, 2));
        assert_eq!(days[6].date, d(8));
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let ledger = seeded();
        ledger.fail_reads("purchases");
        let agg = CostAggregator::new(ledger, 32.8);
        let err = agg.totals("t", week()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LedgerReadFailed);
    }
}
