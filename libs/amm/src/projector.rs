//! Hypothetical curve states
//!
//! Builds the curve that would exist after a swap, a peg change or a depth
//! rescale. Inputs are borrowed and never modified; each call returns a fresh
//! snapshot.

use crate::curve_math::{resolve_swap_direction, swap};
use types::{
    BaseAmount, BigInt, CurveState, InputAssetKind, MarketState, Peg, Price, Quote, Reserve,
    Result, SwapDirection, TradeIntent,
};

/// Swap input in the units the caller holds it in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapAmount {
    /// Base asset amount (reserve scale)
    Base(BaseAmount),
    /// Quote asset amount (quote scale), converted through the peg
    Quote(Quote),
}

impl SwapAmount {
    pub fn kind(&self) -> InputAssetKind {
        match self {
            SwapAmount::Base(_) => InputAssetKind::Base,
            SwapAmount::Quote(_) => InputAssetKind::Quote,
        }
    }
}

/// Reserves after a swap, returned as `(new_quote_reserve, new_base_reserve)`
///
/// Quote input is first rescaled into reserve units:
/// `amount × AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO / peg`. The invariant
/// `sqrt_k²` is held fixed.
pub fn reserves_after_swap(
    curve: &CurveState,
    amount: &SwapAmount,
    direction: SwapDirection,
) -> Result<(Reserve, Reserve)> {
    let invariant = curve.invariant();
    match amount {
        SwapAmount::Quote(quote) => {
            let reserve_amount = quote.to_reserve(curve.peg_multiplier())?;
            let (new_quote, new_base) = swap(curve.quote_reserve(), &reserve_amount, direction, &invariant)?;
            Ok((new_quote, new_base))
        }
        SwapAmount::Base(base) => {
            let (new_base, new_quote) = swap(curve.base_reserve(), base, direction, &invariant)?;
            Ok((new_quote, new_base))
        }
    }
}

/// Curve after a swap, with invariant root and peg unchanged
pub fn curve_after_swap(curve: &CurveState, amount: &SwapAmount, direction: SwapDirection) -> Result<CurveState> {
    let (new_quote, new_base) = reserves_after_swap(curve, amount, direction)?;
    curve.with_reserves(new_base, new_quote)
}

/// Curve with a new peg multiplier; reserves untouched
pub fn with_peg(curve: &CurveState, new_peg: Peg) -> Result<CurveState> {
    curve.with_peg(new_peg)
}

/// Curve with base, quote and invariant root each scaled by `numerator / denominator`
pub fn with_rescaled_depth(curve: &CurveState, numerator: &BigInt, denominator: &BigInt) -> Result<CurveState> {
    curve.with_rescaled_depth(numerator, denominator)
}

/// Price implied by the unmodified curve
pub fn mark_price(curve: &CurveState) -> Price {
    curve.mark_price()
}

/// Market after a base-denominated trade is filled against the curve
///
/// A long withdraws base from the pool and adds to net open interest; a short
/// does the opposite.
pub fn market_after_trade(market: &MarketState, base_amount: &BaseAmount, intent: TradeIntent) -> Result<MarketState> {
    let direction = resolve_swap_direction(InputAssetKind::Base, intent);
    let curve = curve_after_swap(&market.curve, &SwapAmount::Base(base_amount.clone()), direction)?;
    let net_base_open_interest = match intent {
        TradeIntent::Long => &market.net_base_open_interest + base_amount,
        TradeIntent::Short => &market.net_base_open_interest - base_amount,
    };
    Ok(MarketState::new(curve, net_base_open_interest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::CurveError;

    fn unit_curve() -> CurveState {
        CurveState::new(
            Reserve::from_raw(1000),
            Reserve::from_raw(1000),
            Reserve::from_raw(1000),
            Peg::one(),
        )
        .unwrap()
    }

    #[test]
    fn test_base_swap_returns_quote_first() {
        let (new_quote, new_base) = reserves_after_swap(
            &unit_curve(),
            &SwapAmount::Base(BaseAmount::from_raw(100)),
            SwapDirection::Add,
        )
        .unwrap();

        assert_eq!(new_base, Reserve::from_raw(1100));
        assert_eq!(new_quote, Reserve::from_raw(909));
        // 1100 * 909 = 999_900, one floor division short of k
        assert!(new_base.mul_reserve(&new_quote) <= unit_curve().invariant());
    }

    #[test]
    fn test_quote_swap_goes_through_peg() {
        let curve = CurveState::from_reserves(
            Reserve::from_whole(1000),
            Reserve::from_whole(1000),
            Peg::from_whole(2),
        )
        .unwrap();

        // $200 at peg 2.0 is 100 units of quote reserve
        let (new_quote, new_base) = reserves_after_swap(
            &curve,
            &SwapAmount::Quote(Quote::from_whole(200)),
            SwapDirection::Add,
        )
        .unwrap();

        assert_eq!(new_quote, Reserve::from_whole(1100));
        assert_eq!(new_base, curve.invariant().div_reserve(&Reserve::from_whole(1100)).unwrap());
    }

    #[test]
    fn test_projection_does_not_touch_input() {
        let curve = unit_curve();
        let before = curve.clone();
        let _ = curve_after_swap(&curve, &SwapAmount::Base(BaseAmount::from_raw(10)), SwapDirection::Remove).unwrap();
        let _ = with_peg(&curve, Peg::from_whole(3)).unwrap();
        let _ = with_rescaled_depth(&curve, &BigInt::from(2), &BigInt::from(1)).unwrap();
        assert_eq!(curve, before);
    }

    #[test]
    fn test_overdrawn_swap_fails() {
        let result = reserves_after_swap(
            &unit_curve(),
            &SwapAmount::Base(BaseAmount::from_raw(1000)),
            SwapDirection::Remove,
        );
        assert!(matches!(result, Err(CurveError::InvalidState { .. })));
    }

    #[test]
    fn test_market_after_trade_moves_open_interest() {
        let market = MarketState::new(
            CurveState::from_reserves(Reserve::from_whole(1000), Reserve::from_whole(1000), Peg::one()).unwrap(),
            BaseAmount::zero(),
        );

        let long = market_after_trade(&market, &BaseAmount::from_whole(10), TradeIntent::Long).unwrap();
        assert_eq!(long.net_base_open_interest, BaseAmount::from_whole(10));
        assert_eq!(long.curve.base_reserve(), &Reserve::from_whole(990));
        assert!(long.curve.mark_price() > market.curve.mark_price());

        let short = market_after_trade(&market, &BaseAmount::from_whole(10), TradeIntent::Short).unwrap();
        assert_eq!(short.net_base_open_interest, BaseAmount::from_whole(-10));
        assert_eq!(short.curve.base_reserve(), &Reserve::from_whole(1010));
        assert!(short.curve.mark_price() < market.curve.mark_price());
    }

    #[test]
    fn test_swap_amount_kind() {
        assert_eq!(SwapAmount::Base(BaseAmount::zero()).kind(), InputAssetKind::Base);
        assert_eq!(SwapAmount::Quote(Quote::zero()).kind(), InputAssetKind::Quote);
    }
}
