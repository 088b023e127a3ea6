//! Constant-product swap math
//!
//! One side of the curve is moved by the swap amount; the other side is
//! derived as `k / new_input`. Floor division loses at most one unit on the
//! derived side, which is how the invariant survives every projection.

use types::{CurveError, InputAssetKind, Invariant, Reserve, Result, SwapDirection, TradeIntent};

/// Apply a one-sided swap to `input_reserve`
///
/// # Arguments
/// * `input_reserve` - Reserve of the asset being supplied or withdrawn
/// * `swap_amount` - Non-negative amount at reserve scale
/// * `direction` - Whether the input reserve grows or shrinks
/// * `invariant` - `k` held fixed across the swap
///
/// # Returns
/// `(new_input_reserve, new_output_reserve)`
///
/// Withdrawing more than the reserve holds is the caller's bug; it surfaces
/// as `InvalidState` because the derived reserve cannot be computed.
pub fn swap(
    input_reserve: &Reserve,
    swap_amount: &Reserve,
    direction: SwapDirection,
    invariant: &Invariant,
) -> Result<(Reserve, Reserve)> {
    if swap_amount.is_negative() {
        return Err(CurveError::invalid_input(
            "swap",
            format!("swap amount must be non-negative, got {swap_amount}"),
        ));
    }

    let new_input_reserve = match direction {
        SwapDirection::Add => input_reserve + swap_amount,
        SwapDirection::Remove => input_reserve - swap_amount,
    };
    let new_output_reserve = invariant.div_reserve(&new_input_reserve)?;

    Ok((new_input_reserve, new_output_reserve))
}

/// Translate a long/short on the supplied asset into a reserve operation
///
/// Going long on base withdraws base from the pool; going short while
/// supplying quote withdraws quote. Every other combination adds.
pub fn resolve_swap_direction(input: InputAssetKind, intent: TradeIntent) -> SwapDirection {
    match (input, intent) {
        (InputAssetKind::Base, TradeIntent::Long) => SwapDirection::Remove,
        (InputAssetKind::Quote, TradeIntent::Short) => SwapDirection::Remove,
        _ => SwapDirection::Add,
    }
}
