//! Position valuation against a curve
//!
//! Cost estimation only needs one thing from valuation: the quote value of a
//! net position against a given curve, evaluated identically before and after
//! a hypothetical change. [`PositionValuation`] is that seam.

use crate::curve_math::resolve_swap_direction;
use crate::projector::{reserves_after_swap, SwapAmount};
use types::{CurveState, InputAssetKind, NetPosition, Quote, Result, TradeIntent};

/// Values a net position against a curve
pub trait PositionValuation {
    /// Quote the position would realise if closed against `curve` now
    fn base_asset_value(&self, curve: &CurveState, position: &NetPosition) -> Result<Quote>;

    /// Unrealised PnL relative to the position's entry value
    ///
    /// Longs gain when the closing value exceeds the entry value; shorts gain
    /// when it falls below. A flat position has no PnL.
    fn position_pnl(&self, curve: &CurveState, position: &NetPosition) -> Result<Quote> {
        if position.base_amount.is_zero() {
            return Ok(Quote::zero());
        }
        let value = self.base_asset_value(curve, position)?;
        if position.base_amount.is_positive() {
            Ok(&value - &position.quote_amount)
        } else {
            Ok(&position.quote_amount - &value)
        }
    }
}

/// Values a position by simulating its close against the curve
///
/// The quote reserve change of the closing swap is priced with the curve's peg.
/// Closing a short rounds the cost up by one quote unit so the protocol never
/// under-collects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosingSwapValuation;

impl PositionValuation for ClosingSwapValuation {
    fn base_asset_value(&self, curve: &CurveState, position: &NetPosition) -> Result<Quote> {
        if position.base_amount.is_zero() {
            return Ok(Quote::zero());
        }

        let close = TradeIntent::to_close(&position.base_amount);
        let (new_quote_reserve, _) = reserves_after_swap(
            curve,
            &SwapAmount::Base(position.base_amount.abs()),
            resolve_swap_direction(InputAssetKind::Base, close),
        )?;

        let peg = curve.peg_multiplier();
        match close {
            TradeIntent::Short => Ok((curve.quote_reserve() - &new_quote_reserve).to_quote(peg)),
            TradeIntent::Long => {
                let value = (&new_quote_reserve - curve.quote_reserve()).to_quote(peg);
                Ok(value + Quote::from_raw(1))
            }
        }
    }
}
