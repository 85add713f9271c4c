//! # Money and Discount Rates
//!
//! All amounts are whole cents in an `i64`. Percentages are held as basis
//! points so the only rounding in the crate happens in one place,
//! [`Money::apply_discount`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  catalog 549.99   ──►  Money(54999)                                     │
//! │  percentageOff 12.5  ──►  DiscountRate(1250 bps)                        │
//! │                                                                         │
//! │  Money(10950) × 5% ──► discount 547.5¢ ──► rounds half-up to 548¢       │
//! │                    ──► Money(10402)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust
//! use till_core::money::{DiscountRate, Money};
//!
//! let atv = Money::from_cents(10950);
//! assert_eq!(atv.multiply_quantity(2).cents(), 21900);
//!
//! let tv = Money::from_cents(10000);
//! assert_eq!(tv.apply_discount(DiscountRate::from_percentage(10.0)).cents(), 9000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

/// Basis points in 100%.
const FULL_RATE_BPS: i128 = 10_000;

// =============================================================================
// Money
// =============================================================================

/// An amount in cents. Negative values only appear as intermediate
/// differences; prices and totals are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole-unit part, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Cents past the whole unit, 0..=99 regardless of sign.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Price of `qty` units at this unit price.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// This amount less `rate`, with the discount rounded half-up to a cent.
    ///
    /// ```rust
    /// use till_core::money::{DiscountRate, Money};
    ///
    /// // 5% of $109.50 is $5.475, taken off as $5.48
    /// let atv = Money::from_cents(10950);
    /// assert_eq!(atv.apply_discount(DiscountRate::from_bps(500)).cents(), 10402);
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        let discount = (i128::from(self.0) * i128::from(rate.bps()) + FULL_RATE_BPS / 2) / FULL_RATE_BPS;
        Money(self.0 - discount as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-")?;
        }
        write!(f, "${}.{:02}", self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%), 0..=10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Rate from basis points, capped at 100%.
    pub const fn from_bps(bps: u32) -> Self {
        if bps > FULL_RATE_BPS as u32 {
            DiscountRate(FULL_RATE_BPS as u32)
        } else {
            DiscountRate(bps)
        }
    }

    /// Rate from an authored percentage such as `12.5`. Out-of-range input is
    /// clamped to 0..=100; sub-basis-point precision is rounded away.
    pub fn from_percentage(pct: f64) -> Self {
        let bps = (pct.clamp(0.0, 100.0) * 100.0).round();
        DiscountRate(bps as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}
