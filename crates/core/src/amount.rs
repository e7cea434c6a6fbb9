//! TokenAmount - Base-unit token quantities
//!
//! Balances are stored as integer base units. UI amounts (e.g. `1.5` of a
//! token with 9 decimals) are converted only at the edges.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest decimals value whose scale factor fits in a `u64`
pub const MAX_DECIMALS: u8 = 19;

/// Errors that can occur when converting amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Amount {value} has more precision than {decimals} decimals")]
    TooPrecise { value: Decimal, decimals: u8 },

    #[error("Amount {0} does not fit in base units")]
    Overflow(Decimal),

    #[error("Unsupported decimals: {0} (max 19)")]
    UnsupportedDecimals(u8),
}

/// A token quantity in base units.
///
/// # Example
/// ```
/// use hookgate_core::TokenAmount;
/// use rust_decimal::Decimal;
///
/// let amount = TokenAmount::from_ui(Decimal::new(15, 1), 9).unwrap(); // 1.5
/// assert_eq!(amount.value(), 1_500_000_000);
/// assert_eq!(amount.to_ui(9), Decimal::new(15, 1));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero amount constant
    pub const ZERO: Self = Self(0);

    /// Wrap a base-unit value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the base-unit value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert a UI amount into base units for a mint with `decimals`
    pub fn from_ui(value: Decimal, decimals: u8) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::NegativeAmount(value));
        }
        if decimals > MAX_DECIMALS {
            return Err(AmountError::UnsupportedDecimals(decimals));
        }

        let scale = Decimal::from(10u64.pow(u32::from(decimals)));
        let scaled = value
            .checked_mul(scale)
            .ok_or(AmountError::Overflow(value))?;

        if !scaled.fract().is_zero() {
            return Err(AmountError::TooPrecise { value, decimals });
        }

        scaled.to_u64().map(Self).ok_or(AmountError::Overflow(value))
    }

    /// Convert base units into a UI amount for a mint with `decimals`
    pub fn to_ui(&self, decimals: u8) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), u32::from(decimals)).normalize()
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }

    /// Checked subtraction - returns None if result would be negative
    pub fn checked_sub(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(TokenAmount)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<TokenAmount> for u64 {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}
