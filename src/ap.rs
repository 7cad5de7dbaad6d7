//! Fixed-point Action Point arithmetic.
//!
//! All AP values in the engine are rationals representable as k * 0.1 for
//! integer k. Floating drift from repeated arithmetic is normalized through
//! [`clean`] before every comparison and after every mutation, so a stored
//! gauge never accumulates error beyond one cleaning step.

use crate::error::CombatError;

/// Time budget for a full turn, in seconds of action.
pub const TURN_AP: f64 = 6.0;

/// Sentinel meaning "spend everything left". Callers replace it with the
/// cleaned current AP before deducting.
pub const ALL_REMAINING_AP: f64 = -1.0;

/// How far a requested amount may sit from its cleaned value before the
/// request is rejected as a precision violation.
pub const PRECISION_TOLERANCE: f64 = 0.001;

/// Snap a value to the 0.1 grid.
pub fn clean(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round *up* to the next 0.1. Cost formulas never hand out fractional
/// tenths in the payer's favor. The epsilon keeps a value already on the
/// grid from being bumped a tenth by representation error.
pub fn tactical_round(value: f64) -> f64 {
    ((value * 10.0 - 1e-9).ceil() / 10.0).max(0.0)
}

/// True when `value` is already on the 0.1 grid (within tolerance).
pub fn is_clean(value: f64) -> bool {
    (value - clean(value)).abs() <= PRECISION_TOLERANCE
}

/// Deduct `amount` from `current`, returning the new cleaned value.
///
/// Fails with `PrecisionViolation` when the amount is off-grid by more than
/// the tolerance, and with `InsufficientAp` when the cleaned amount exceeds
/// the cleaned balance.
pub fn deduct(current: f64, amount: f64) -> Result<f64, CombatError> {
    if !is_clean(amount) {
        return Err(CombatError::PrecisionViolation { amount });
    }
    let amount = clean(amount);
    let available = clean(current);
    if amount > available {
        return Err(CombatError::InsufficientAp {
            needed: amount,
            available,
        });
    }
    Ok(clean(available - amount))
}
