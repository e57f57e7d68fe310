//! Utility billing arithmetic.
//!
//! Water and electricity share one formula:
//! `(current - previous) * unit_price + fixed_fee`. Everything stays at full
//! decimal precision until [`round_currency`] is applied on the way to
//! storage.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::models::ExpenseType;

/// Default day of the month used when a contract has no due day
const DEFAULT_DUE_DAY: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("current reading ({current}) cannot be lower than previous reading ({previous})")]
    InvalidReading { previous: Decimal, current: Decimal },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("amount is too large to compute")]
    Overflow,
}

/// Metered utility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    Water,
    Electricity,
}

impl Utility {
    pub fn unit(&self) -> &'static str {
        match self {
            Utility::Water => "m³",
            Utility::Electricity => "kWh",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Utility::Water => "Water",
            Utility::Electricity => "Electricity",
        }
    }

    pub fn expense_type(&self) -> ExpenseType {
        match self {
            Utility::Water => ExpenseType::Water,
            Utility::Electricity => ExpenseType::Electricity,
        }
    }

    /// Description stored when the landlord leaves it blank,
    /// e.g. `Water - 2024-05 (24.7m³)`
    pub fn default_description(&self, reference_month: &str, consumption: Decimal) -> String {
        format!(
            "{} - {} ({}{})",
            self.label(),
            reference_month,
            consumption.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
            self.unit()
        )
    }
}

/// A pair of meter readings, guaranteed non-decreasing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterReading {
    previous: Decimal,
    current: Decimal,
}

impl MeterReading {
    pub fn new(previous: Decimal, current: Decimal) -> Result<Self, BillingError> {
        if previous < Decimal::ZERO {
            return Err(BillingError::Negative { field: "previous reading" });
        }
        if current < previous {
            return Err(BillingError::InvalidReading { previous, current });
        }
        Ok(Self { previous, current })
    }

    pub fn previous(&self) -> Decimal {
        self.previous
    }

    pub fn current(&self) -> Decimal {
        self.current
    }

    pub fn consumption(&self) -> Decimal {
        self.current - self.previous
    }
}

/// Validated inputs for one utility charge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilityCharge {
    pub reading: MeterReading,
    pub unit_price: Decimal,
    pub fixed_fee: Decimal,
}

impl UtilityCharge {
    pub fn new(
        reading: MeterReading,
        unit_price: Decimal,
        fixed_fee: Option<Decimal>,
    ) -> Result<Self, BillingError> {
        let fixed_fee = fixed_fee.unwrap_or(Decimal::ZERO);
        if unit_price < Decimal::ZERO {
            return Err(BillingError::Negative { field: "unit price" });
        }
        if fixed_fee < Decimal::ZERO {
            return Err(BillingError::Negative { field: "fixed fee" });
        }
        Ok(Self {
            reading,
            unit_price,
            fixed_fee,
        })
    }

    /// Unrounded cost
    pub fn cost(&self) -> Result<Decimal, BillingError> {
        self.reading
            .consumption()
            .checked_mul(self.unit_price)
            .and_then(|v| v.checked_add(self.fixed_fee))
            .ok_or(BillingError::Overflow)
    }
}

/// Round to cents, half away from zero (35.875 -> 35.88)
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate a `YYYY-MM` reference month, returning its first day
pub fn parse_reference_month(month: &str) -> Option<NaiveDate> {
    if month.len() != 7 || month.as_bytes().get(4) != Some(&b'-') {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()
}

/// Suggested due date for a new charge.
///
/// With a contract due day, that day in the current month (clamped to the
/// month's length), pushed to next month once it has passed. Without one,
/// the 10th of next month.
pub fn default_due_date(today: NaiveDate, due_day: Option<u32>) -> NaiveDate {
    let this_month = first_of_month(today);
    match due_day {
        Some(day) => {
            let candidate = day_in_month(this_month, day);
            if candidate < today {
                day_in_month(next_month(this_month), day)
            } else {
                candidate
            }
        }
        None => day_in_month(next_month(this_month), DEFAULT_DUE_DAY),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(first: NaiveDate) -> NaiveDate {
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

fn day_in_month(first: NaiveDate, day: u32) -> NaiveDate {
    let last = next_month(first).pred_opt().map(|d| d.day()).unwrap_or(28);
    first.with_day(day.clamp(1, last)).unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_water_cost_example() {
        let reading = MeterReading::new(dec("1250.500"), dec("1275.200")).unwrap();
        let charge = UtilityCharge::new(reading, dec("1.25"), Some(dec("5.00"))).unwrap();
        assert_eq!(reading.consumption(), dec("24.700"));
        assert_eq!(charge.cost().unwrap(), dec("35.875"));
        assert_eq!(round_currency(charge.cost().unwrap()), dec("35.88"));
    }

    #[test]
    fn test_fixed_fee_defaults_to_zero() {
        let reading = MeterReading::new(dec("100"), dec("150")).unwrap();
        let charge = UtilityCharge::new(reading, dec("0.2"), None).unwrap();
        assert_eq!(charge.cost().unwrap(), dec("10.0"));
    }

    #[test]
    fn test_cost_keeps_full_precision() {
        let reading = MeterReading::new(dec("0"), dec("3.333")).unwrap();
        let charge = UtilityCharge::new(reading, dec("0.1537"), None).unwrap();
        assert_eq!(charge.cost().unwrap(), dec("0.5122821"));
        assert_eq!(round_currency(charge.cost().unwrap()), dec("0.51"));
    }

    #[test]
    fn test_zero_consumption_is_fee_only() {
        let reading = MeterReading::new(dec("42.5"), dec("42.5")).unwrap();
        let charge = UtilityCharge::new(reading, dec("0.9"), Some(dec("3.10"))).unwrap();
        assert_eq!(charge.cost().unwrap(), dec("3.10"));
    }

    #[test]
    fn test_cost_overflow_is_an_error() {
        let reading = MeterReading::new(Decimal::ZERO, Decimal::MAX).unwrap();
        let charge = UtilityCharge::new(reading, dec("2"), None).unwrap();
        assert_eq!(charge.cost(), Err(BillingError::Overflow));

        let charge = UtilityCharge::new(reading, Decimal::ONE, Some(Decimal::ONE)).unwrap();
        assert_eq!(charge.cost(), Err(BillingError::Overflow));
    }

    #[test]
    fn test_lower_current_reading_rejected() {
        let err = MeterReading::new(dec("1275.2"), dec("1250.5")).unwrap_err();
        assert_eq!(
            err,
            BillingError::InvalidReading {
                previous: dec("1275.2"),
                current: dec("1250.5"),
            }
        );
    }

    #[test]
    fn test_negative_rates_rejected() {
        let reading = MeterReading::new(dec("1"), dec("2")).unwrap();
        assert!(UtilityCharge::new(reading, dec("-0.1"), None).is_err());
        assert!(UtilityCharge::new(reading, dec("0.1"), Some(dec("-1"))).is_err());
        assert!(MeterReading::new(dec("-1"), dec("2")).is_err());
    }

    #[test]
    fn test_round_currency_half_up() {
        assert_eq!(round_currency(dec("35.875")), dec("35.88"));
        assert_eq!(round_currency(dec("35.865")), dec("35.87"));
        assert_eq!(round_currency(dec("0.004")), dec("0.00"));
    }

    #[test]
    fn test_default_description() {
        assert_eq!(
            Utility::Water.default_description("2024-05", dec("24.700")),
            "Water - 2024-05 (24.7m³)"
        );
        assert_eq!(
            Utility::Electricity.default_description("2024-05", dec("310.25")),
            "Electricity - 2024-05 (310.3kWh)"
        );
    }

    #[test]
    fn test_parse_reference_month() {
        assert_eq!(parse_reference_month("2024-05"), Some(date("2024-05-01")));
        assert_eq!(parse_reference_month("2024-13"), None);
        assert_eq!(parse_reference_month("2024-5"), None);
        assert_eq!(parse_reference_month("202405"), None);
        assert_eq!(parse_reference_month(""), None);
    }

    #[test]
    fn test_default_due_date_with_due_day() {
        assert_eq!(default_due_date(date("2024-05-03"), Some(5)), date("2024-05-05"));
        assert_eq!(default_due_date(date("2024-05-05"), Some(5)), date("2024-05-05"));
        assert_eq!(default_due_date(date("2024-05-06"), Some(5)), date("2024-06-05"));
    }

    #[test]
    fn test_default_due_date_clamps_short_months() {
        assert_eq!(default_due_date(date("2024-02-01"), Some(31)), date("2024-02-29"));
        assert_eq!(default_due_date(date("2024-12-31"), Some(30)), date("2025-01-30"));
    }

    #[test]
    fn test_default_due_date_without_due_day() {
        assert_eq!(default_due_date(date("2024-05-20"), None), date("2024-06-10"));
        assert_eq!(default_due_date(date("2024-12-01"), None), date("2025-01-10"));
    }
}
