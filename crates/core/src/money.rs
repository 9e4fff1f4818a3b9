//! Money conventions shared across the workspace.
//!
//! Amounts are fixed-point decimals. Accounts carry a single currency fixed
//! at creation; there is no conversion between currencies.

use rust_decimal::Decimal;

/// Currency assigned to newly opened accounts.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Largest number of decimal places an amount may carry on the wire.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Whether `amount` stays within [`MAX_AMOUNT_SCALE`].
pub fn has_valid_scale(amount: &Decimal) -> bool {
    amount.scale() <= MAX_AMOUNT_SCALE
}
