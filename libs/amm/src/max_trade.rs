//! Largest base trade that moves the curve to a limit price

use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{BaseAmount, BigInt, CurveError, CurveState, Price, Result, TradeIntent, PEG_PRECISION, MARK_PRICE_PRECISION};

/// Base amount and direction of the trade that reaches a limit price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxTrade {
    pub amount: BaseAmount,
    pub direction: TradeIntent,
}

impl MaxTrade {
    /// The curve already sits at the limit price; no trade is needed
    pub fn is_degenerate(&self) -> bool {
        self.amount.is_zero()
    }
}

/// Trade that takes the curve's price to `limit_price`
///
/// Solves the base reserve at which the curve prices at the limit,
/// `new_base² = k × PRICE × peg / (limit × PEG)`, and compares it with the
/// current base reserve. A larger solved reserve means base must be sold into
/// the pool (short); a smaller one means base must be bought out (long).
/// When they match the result is a zero-sized long.
pub fn max_base_trade_to_price(curve: &CurveState, limit_price: &Price) -> Result<MaxTrade> {
    if !limit_price.is_positive() {
        return Err(CurveError::invalid_input(
            "max_base_trade_to_price",
            format!("limit price must be positive, got {limit_price}"),
        ));
    }

    let numerator = BigInt::from(MARK_PRICE_PRECISION) * curve.peg_multiplier().raw();
    let denominator = limit_price.raw() * BigInt::from(PEG_PRECISION);
    let new_base_reserve = curve.invariant().mul_div(&numerator, &denominator)?.isqrt()?;
    let base_reserve = curve.base_reserve();

    let trade = if &new_base_reserve > base_reserve {
        MaxTrade {
            amount: &new_base_reserve - base_reserve,
            direction: TradeIntent::Short,
        }
    } else {
        MaxTrade {
            amount: base_reserve - &new_base_reserve,
            direction: TradeIntent::Long,
        }
    };

    if trade.is_degenerate() {
        debug!(
            limit_price = %limit_price,
            mark_price = %curve.mark_price(),
            "Curve already at limit price, no trade needed"
        );
    }
    Ok(trade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::market_after_trade;
    use types::{MarketState, Peg, Reserve};

    fn curve() -> CurveState {
        CurveState::from_reserves(
            Reserve::from_whole(1_000_000),
            Reserve::from_whole(1_000_000),
            Peg::from_whole(40),
        )
        .unwrap()
    }

    #[test]
    fn test_limit_at_mark_is_degenerate() {
        let curve = curve();
        let trade = max_base_trade_to_price(&curve, &curve.mark_price()).unwrap();
        assert!(trade.is_degenerate());
        assert_eq!(trade.direction, TradeIntent::Long);
    }

    #[test]
    fn test_limit_above_mark_buys_base() {
        // Price 160 = 40 × 4 needs the base reserve halved
        let trade = max_base_trade_to_price(&curve(), &Price::from_whole(160)).unwrap();
        assert_eq!(trade.direction, TradeIntent::Long);
        assert_eq!(trade.amount, BaseAmount::from_whole(500_000));
    }

    #[test]
    fn test_limit_below_mark_sells_base() {
        // Price 10 = 40 / 4 needs the base reserve doubled
        let trade = max_base_trade_to_price(&curve(), &Price::from_whole(10)).unwrap();
        assert_eq!(trade.direction, TradeIntent::Short);
        assert_eq!(trade.amount, BaseAmount::from_whole(1_000_000));
    }

    #[test]
    fn test_trade_lands_on_limit() {
        let market = MarketState::new(curve(), BaseAmount::zero());
        let limit = Price::from_whole(50);
        let trade = max_base_trade_to_price(&market.curve, &limit).unwrap();
        let after = market_after_trade(&market, &trade.amount, trade.direction).unwrap();

        let reached = after.curve.mark_price();
        let slack = Price::from_whole(1).mul_div(&BigInt::from(1), &BigInt::from(1_000_000)).unwrap();
        assert!((&reached - &limit).abs() <= slack, "reached {reached}");
    }

    #[test]
    fn test_non_positive_limit_rejected() {
        for limit in [Price::zero(), Price::from_whole(-1)] {
            let result = max_base_trade_to_price(&curve(), &limit);
            assert!(matches!(result, Err(CurveError::InvalidInput { .. })));
        }
    }
}
