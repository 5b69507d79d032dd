//! Money helpers
//!
//! Amounts are `Decimal` in the domain and whole cents in storage.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{FflBroError, Result};

/// Round to two decimal places, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `amount` has no fractional cents.
pub fn is_whole_cents(amount: Decimal) -> bool {
    amount.round_dp(2) == amount
}

/// Convert an amount to integer cents.
///
/// Fails with `InvalidPrice` when the amount carries fractional cents or does
/// not fit into an `i64`.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    if !is_whole_cents(amount) {
        return Err(FflBroError::InvalidPrice(format!("{amount} has fractional cents")));
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| FflBroError::InvalidPrice(format!("{amount} is out of range")))
}

/// Convert integer cents back into an amount with scale 2.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
