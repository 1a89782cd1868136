//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Also hosts the conversions from raw on-chain integers (token amounts,
//! price ratios) into decimals.

use alloy_primitives::aliases::U512;
use alloy_primitives::{I256, U256};
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest scale a rust_decimal value can carry.
const MAX_SCALE: u32 = 28;

/// Largest token decimal exponent accepted (`10^77` still fits in 256 bits).
pub const MAX_TOKEN_DECIMALS: u8 = 77;

/// Lossless decimal numeric type for token amounts and prices.
///
/// Backed by rust_decimal to avoid floating-point drift.
/// Serializes to a JSON string so no precision is lost on the way out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::str")] RustDecimal);

/// Failure while turning a raw integer into a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("value does not fit in a 96-bit decimal mantissa")]
    Overflow,
    #[error("unsupported decimal exponent: {0}")]
    UnsupportedExponent(u8),
}

impl Decimal {
    /// Create a Decimal from a RustDecimal.
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        // Use normalize() to remove trailing zeros, then format without exponent
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    /// Get the underlying RustDecimal.
    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// The multiplicative identity (1).
    pub fn one() -> Self {
        Decimal(RustDecimal::ONE)
    }

    /// Returns the value 10.
    pub fn ten() -> Self {
        Decimal(RustDecimal::TEN)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    pub fn checked_mul(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

// Arithmetic operations
impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

/// Scale a signed raw token amount by `10^decimals`.
///
/// Exact whenever the result fits rust_decimal's 96-bit mantissa at the
/// requested scale; otherwise the most precise representable value is used.
///
/// # Errors
/// [`DecimalError::Overflow`] if the integer part itself does not fit,
/// [`DecimalError::UnsupportedExponent`] above [`MAX_TOKEN_DECIMALS`].
pub fn to_decimal(raw: I256, decimals: u8) -> Result<Decimal, DecimalError> {
    let magnitude = unsigned_to_decimal(raw.unsigned_abs(), decimals)?;
    if raw.is_negative() {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

/// Unsigned variant of [`to_decimal`], used for mint/burn amounts.
pub fn unsigned_to_decimal(raw: U256, decimals: u8) -> Result<Decimal, DecimalError> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(DecimalError::UnsupportedExponent(decimals));
    }

    let scale = u32::from(decimals);
    if scale <= MAX_SCALE && raw < (U256::from(1u8) << 96usize) {
        let mantissa = u128::try_from(raw).map_err(|_| DecimalError::Overflow)?;
        let mantissa = i128::try_from(mantissa).map_err(|_| DecimalError::Overflow)?;
        return Ok(Decimal(RustDecimal::from_i128_with_scale(mantissa, scale)));
    }

    ratio_to_decimal(U512::from(raw), pow10(scale))
}

/// `10^decimals` as a decimal.
pub fn exponent_to_decimal(decimals: u8) -> Result<Decimal, DecimalError> {
    power_of(Decimal::ten(), u32::from(decimals))
}

/// Division that yields zero instead of failing.
///
/// A zero denominator (and an unrepresentable quotient) returns zero so the
/// reducer stays total on degenerate zero-liquidity states.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::zero();
    }
    numerator
        .0
        .checked_div(denominator.0)
        .map(Decimal)
        .unwrap_or_else(Decimal::zero)
}

/// Raise `base` to a non-negative integer power by repeated multiplication.
pub fn power_of(base: Decimal, exponent: u32) -> Result<Decimal, DecimalError> {
    let mut result = Decimal::one();
    for _ in 0..exponent {
        result = result.checked_mul(base).ok_or(DecimalError::Overflow)?;
    }
    Ok(result)
}

/// Convert the exact ratio `num / den` into the most precise decimal available.
///
/// Picks the largest scale (up to 28) whose scaled quotient still fits the
/// 96-bit mantissa; digits beyond it are truncated. A zero denominator
/// yields zero.
pub fn ratio_to_decimal(num: U512, den: U512) -> Result<Decimal, DecimalError> {
    if den.is_zero() {
        return Ok(Decimal::zero());
    }

    let limit = U512::from(1u8) << 96usize;
    if num / den >= limit {
        return Err(DecimalError::Overflow);
    }

    for scale in (0..=MAX_SCALE).rev() {
        let Some(scaled) = num.checked_mul(pow10(scale)) else {
            continue;
        };
        let quotient = scaled / den;
        if quotient < limit {
            let mantissa = u128::try_from(quotient).map_err(|_| DecimalError::Overflow)?;
            let mantissa = i128::try_from(mantissa).map_err(|_| DecimalError::Overflow)?;
            return Ok(Decimal(RustDecimal::from_i128_with_scale(mantissa, scale)));
        }
    }

    Err(DecimalError::Overflow)
}

pub(crate) fn pow10(exponent: u32) -> U512 {
    let ten = U512::from(10u8);
    (0..exponent).fold(U512::from(1u8), |acc, _| acc * ten)
}
