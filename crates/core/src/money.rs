use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A monetary value in the statement's currency unit, held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Arithmetic mean of `count` values summing to `total`; zero for an empty set.
    pub fn mean(total: Money, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money::from_decimal(total.0 / Decimal::from(count as u64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// Saturating: totals over absurd inputs clamp at the Decimal limits.
impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn m(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn from_decimal_rounds_to_cents() {
        assert_eq!(m("10.005").to_string(), "10.00");
        assert_eq!(m("10.015").to_string(), "10.02");
    }

    #[test]
    fn mean_of_empty_set_is_zero() {
        assert_eq!(Money::mean(m("100"), 0), Money::zero());
    }

    #[test]
    fn mean_divides_total() {
        assert_eq!(Money::mean(m("100"), 4), m("25"));
        assert_eq!(Money::mean(m("100"), 3), m("33.33"));
    }

    #[test]
    fn sum_and_abs() {
        let total: Money = [m("1.50"), m("-4.00"), m("2.50")].iter().sum();
        assert_eq!(total, Money::zero());
        assert_eq!(m("-4").abs(), m("4"));
        assert!(m("-0.01").is_negative());
        assert!(!Money::zero().is_negative());
    }

    #[test]
    fn sums_clamp_instead_of_overflowing() {
        let huge = m("60000000000000000000000000000");
        let owed = m("-60000000000000000000000000000");
        assert_eq!((huge + huge).as_decimal(), Decimal::MAX);
        assert_eq!((owed - huge).as_decimal(), Decimal::MIN);
        let total: Money = [huge, huge, owed].iter().sum();
        assert_eq!(total.as_decimal(), Decimal::MAX - huge.as_decimal());
    }
}
