//! # Money Module
//!
//! Numeric coercion for currency values plus the `Money` cents type.
//!
//! ## Two Representations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE EACH FORM IS USED                                                │
//! │                                                                         │
//! │  f64 amounts (175.5)                                                    │
//! │    • What the hosted database stores in `numeric` columns               │
//! │    • What the web client sends (`price`, `quantity`)                    │
//! │    • What the calculator works on, so audits match the client exactly   │
//! │                                                                         │
//! │  Money (17550 cents)                                                    │
//! │    • Invoice lines and display formatting                               │
//! │    • Anything that has to add up to the cent                            │
//! │                                                                         │
//! │  Every f64 entering the crate passes through safe_num / money first:   │
//! │    None, NaN, ±∞  ──►  0.0                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::{money, safe_num, Money};
//!
//! assert_eq!(safe_num(Some(f64::NAN)), 0.0);
//! assert_eq!(money(Some(-3.0)), 0.0);
//!
//! let line = Money::from_amount(12.346);
//! assert_eq!(line.cents(), 1235);
//! assert_eq!(line.to_string(), "12.35");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Coercion Helpers
// =============================================================================

/// Coerces a possibly-missing number to a finite value.
///
/// `None`, `NaN` and infinities become `0.0`; everything else passes through.
#[inline]
pub fn safe_num(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Coerces a possibly-missing monetary amount: finite and never negative.
#[inline]
pub fn money(value: Option<f64>) -> f64 {
    safe_num(value).max(0.0)
}

/// Coerces a possibly-missing fraction into `[0, 1]`.
#[inline]
pub fn rate(value: Option<f64>) -> f64 {
    safe_num(value).clamp(0.0, 1.0)
}

/// Coerces a possibly-missing quantity to a whole, non-negative count.
///
/// Fractions are truncated and values beyond `u32::MAX` saturate.
#[inline]
pub fn quantity(value: Option<f64>) -> u32 {
    // `as` saturates for out-of-range floats
    safe_num(value).max(0.0).trunc() as u32
}

/// Rounds an amount to whole cents, half away from zero.
///
/// For display only; the calculator itself never rounds.
#[inline]
pub fn round_to_cents(amount: f64) -> f64 {
    (safe_num(Some(amount)) * 100.0).round() / 100.0
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents / paisa).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences between stored and recalculated totals
///   can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounded to the cent.
    ///
    /// The amount is coerced with [`money`] first, so garbage becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(183.5).cents(), 18350);
    /// assert_eq!(Money::from_amount(f64::INFINITY).cents(), 0);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        let cents = (money(Some(amount)) * 100.0).round();
        // `as` saturates, so absurd amounts clamp instead of wrapping
        Money(cents as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal amount.
    #[inline]
    pub fn amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn whole(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(32000); // Kacchi Biryani
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 96000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.whole().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
