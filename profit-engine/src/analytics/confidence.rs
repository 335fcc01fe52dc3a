//! Confidence-graded metric displays
//!
//! A missing input is never shown as 0%. Each display carries a confidence
//! tier so the caller can tell measured, estimated and unknown values apart.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::EstimateHeuristic;
use crate::utils::money::{format_currency, format_percent, percent_of, serialize_money_opt, to_decimal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDisplay {
    #[serde(serialize_with = "serialize_money_opt")]
    pub value: Option<Decimal>,
    pub confidence: Confidence,
    pub message: String,
    pub tooltip: Option<String>,
}

impl MetricDisplay {
    fn unknown(message: &str) -> Self {
        Self {
            value: None,
            confidence: Confidence::None,
            message: message.to_string(),
            tooltip: None,
        }
    }
}

/// Food cost % with a first-match decision table
pub fn food_cost_display(
    purchases: Decimal,
    sales: Decimal,
    waste: Decimal,
    heuristic: &EstimateHeuristic,
) -> MetricDisplay {
    let zero = Decimal::ZERO;

    if purchases > zero && sales > zero {
        let value = percent_of(purchases, sales);
        return MetricDisplay {
            value: Some(value),
            confidence: Confidence::Medium,
            message: format!("Estimated: {}", format_percent(value)),
            tooltip: Some(
                "Based on purchases only. Add weekly inventory counts for actual food cost.".into(),
            ),
        };
    }

    if purchases.is_zero() && sales > zero && waste > zero {
        // industry baseline plus waste share of sales, never a measurement
        let estimate = to_decimal(heuristic.baseline_percent) + percent_of(waste, sales);
        let value = estimate
            .max(to_decimal(heuristic.min_percent))
            .min(to_decimal(heuristic.max_percent));
        return MetricDisplay {
            value: Some(value),
            confidence: Confidence::Low,
            message: format!("Rough estimate: ~{} ±5%", format_percent(value)),
            tooltip: Some(format!(
                "Industry average ({}%) + waste impact. Add purchase data for accuracy.",
                heuristic.baseline_percent
            )),
        };
    }

    if sales > zero && purchases.is_zero() && waste.is_zero() {
        return MetricDisplay::unknown("Add purchases");
    }

    MetricDisplay::unknown("Add data")
}

/// Waste % of sales; no heuristic fallback
pub fn waste_display(waste: Decimal, sales: Decimal) -> MetricDisplay {
    if sales > Decimal::ZERO {
        let value = percent_of(waste, sales);
        return MetricDisplay {
            value: Some(value),
            confidence: Confidence::Medium,
            message: format_percent(value),
            tooltip: Some(format!(
                "Waste {} ÷ Sales {}",
                format_currency(waste),
                format_currency(sales)
            )),
        };
    }
    MetricDisplay::unknown("Add sales")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimeCostDisplay {
    #[serde(serialize_with = "serialize_money_opt")]
    pub value: Option<Decimal>,
    pub confidence: Confidence,
    pub is_critical: bool,
    pub message: String,
}

/// Food + labor, inheriting the food display's confidence
pub fn prime_cost_display(food: &MetricDisplay, labor_percent: Decimal) -> PrimeCostDisplay {
    match food.value {
        Some(food_value) => {
            let value = food_value + labor_percent;
            PrimeCostDisplay {
                value: Some(value),
                confidence: food.confidence,
                is_critical: value > Decimal::ONE_HUNDRED,
                message: format_percent(value),
            }
        }
        None => PrimeCostDisplay {
            value: None,
            confidence: food.confidence,
            is_critical: false,
            message: food.message.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn heuristic() -> EstimateHeuristic {
        EstimateHeuristic::default()
    }

    #[test]
    fn test_measured_food_cost() {
        let display = food_cost_display(dec(2800), dec(10000), dec(0), &heuristic());
        assert_eq!(display.value, Some(dec(28)));
        assert_eq!(display.confidence, Confidence::Medium);
        assert_eq!(display.message, "Estimated: 28.0%");
    }

    #[test]
    fn test_heuristic_food_cost() {
        let display = food_cost_display(dec(0), dec(10000), dec(500), &heuristic());
        assert_eq!(display.confidence, Confidence::Low);
        assert_eq!(display.value, Some(dec(35)));
        assert_eq!(display.message, "Rough estimate: ~35.0% ±5%");

        // 30 + 50 is clamped to the 45 ceiling
        let display = food_cost_display(dec(0), dec(1000), dec(500), &heuristic());
        assert_eq!(display.value, Some(dec(45)));
    }

    #[test]
    fn test_unknown_food_cost() {
        let display = food_cost_display(dec(0), dec(10000), dec(0), &heuristic());
        assert_eq!(display.confidence, Confidence::None);
        assert_eq!(display.value, None);
        assert_eq!(display.message, "Add purchases");

        let display = food_cost_display(dec(500), dec(0), dec(0), &heuristic());
        assert_eq!(display.value, None);
        assert_eq!(display.message, "Add data");

        let json = serde_json::to_value(&display).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["confidence"], "none");
    }

    #[test]
    fn test_waste_display() {
        let display = waste_display(dec(250), dec(10000));
        assert_eq!(display.value, Some(Decimal::new(25, 1)));
        assert_eq!(display.message, "2.5%");
        assert_eq!(display.tooltip.as_deref(), Some("Waste $250.00 ÷ Sales $10,000.00"));

        let display = waste_display(dec(250), dec(0));
        assert_eq!(display.confidence, Confidence::None);
        assert_eq!(display.value, None);
    }

    #[test]
    fn test_prime_cost_inherits_confidence() {
        let food = food_cost_display(dec(0), dec(10000), dec(500), &heuristic());
        let prime = prime_cost_display(&food, Decimal::new(328, 1));
        assert_eq!(prime.confidence, Confidence::Low);
        assert_eq!(prime.value, Some(Decimal::new(678, 1)));
        assert!(!prime.is_critical);

        let food = food_cost_display(dec(8000), dec(10000), dec(0), &heuristic());
        let prime = prime_cost_display(&food, Decimal::new(328, 1));
        assert!(prime.is_critical);

        let food = food_cost_display(dec(0), dec(0), dec(0), &heuristic());
        let prime = prime_cost_display(&food, Decimal::ZERO);
        assert_eq!(prime.value, None);
        assert!(!prime.is_critical);
    }
}
