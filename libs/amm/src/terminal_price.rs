//! Terminal price: where the curve would sit if all net open interest closed now

use crate::curve_math::resolve_swap_direction;
use crate::projector::{reserves_after_swap, SwapAmount};
use types::{InputAssetKind, MarketState, Price, Result, TradeIntent};

/// Price after closing the market's entire net open interest against the curve
///
/// A net-long book closes by selling base (short intent) and vice versa. The
/// peg is left unchanged. With no open interest there is nothing to close and
/// the mark price is returned.
pub fn terminal_price(market: &MarketState) -> Result<Price> {
    let open_interest = &market.net_base_open_interest;
    if open_interest.is_zero() {
        return Ok(market.curve.mark_price());
    }

    let close = TradeIntent::to_close(open_interest);
    let (new_quote_reserve, new_base_reserve) = reserves_after_swap(
        &market.curve,
        &SwapAmount::Base(open_interest.abs()),
        resolve_swap_direction(InputAssetKind::Base, close),
    )?;

    Ok(Price::from_reserves(
        &new_base_reserve,
        &new_quote_reserve,
        market.curve.peg_multiplier(),
    ))
}
