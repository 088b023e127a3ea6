//! Price-shock scenarios
//!
//! Pushes a market's price from its mark toward its terminal price in equal
//! steps, then asks at each step what it would cost to repeg the shocked curve
//! back to the original mark price.

use crate::cost::{CostEstimate, CostEstimator, RepegDiagnostics};
use crate::max_trade::{max_base_trade_to_price, MaxTrade};
use crate::projector::market_after_trade;
use crate::terminal_price::terminal_price;
use crate::valuation::PositionValuation;
use rust_decimal::Decimal;
use tracing::{debug, info};
use types::{BigInt, CurveError, MarketState, Peg, Price, Result};

/// One step of a price-shock scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShockStep {
    /// Step number, starting at 1
    pub step: u32,
    /// Relative move of the target price away from mark, e.g. 0.02 for +2%
    pub deviation: Decimal,
    pub target_price: Price,
    /// Trade that pushes the curve to `target_price`
    pub trade: MaxTrade,
    /// Market after the shock trade filled
    pub shocked_market: MarketState,
    /// Peg that returns the shocked curve to the original mark price
    pub new_peg: Peg,
    pub repeg: CostEstimate<RepegDiagnostics>,
}

/// All steps of a scan for one market
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShockScan {
    pub mark_price: Price,
    pub terminal_price: Price,
    pub steps: Vec<ShockStep>,
}

/// Scan `steps` evenly spaced price shocks between mark and terminal price
pub fn scan_price_shocks<V: PositionValuation>(
    estimator: &CostEstimator<V>,
    market: &MarketState,
    steps: u32,
) -> Result<ShockScan> {
    if steps == 0 {
        return Err(CurveError::invalid_input("scan_price_shocks", "steps must be positive"));
    }

    let mark_price = market.curve.mark_price();
    if !mark_price.is_positive() {
        return Err(CurveError::invalid_state(
            "scan_price_shocks",
            format!("mark price must be positive, got {mark_price}"),
        ));
    }
    let terminal_price = terminal_price(market)?;
    let total_move = &terminal_price - &mark_price;
    let mark_decimal = mark_price.to_decimal()?;

    let mut scan = Vec::with_capacity(steps as usize);
    for step in 1..=steps {
        let target_price = &mark_price + &total_move.mul_div(&BigInt::from(step), &BigInt::from(steps))?;
        let deviation = (target_price.to_decimal()? - mark_decimal)
            .checked_div(mark_decimal)
            .ok_or_else(|| CurveError::invalid_state("scan_price_shocks", "deviation overflows Decimal"))?;

        let trade = max_base_trade_to_price(&market.curve, &target_price)?;
        let shocked_market = market_after_trade(market, &trade.amount, trade.direction)?;
        let shocked_mark = shocked_market.curve.mark_price();
        let new_peg = shocked_market
            .curve
            .peg_multiplier()
            .mul_ratio(&mark_price, &shocked_mark)?;
        let repeg = estimator.repeg_cost(&shocked_market, &new_peg)?;

        debug!(
            step,
            deviation = %deviation,
            target_price = %target_price,
            trade_amount = %trade.amount,
            trade_direction = ?trade.direction,
            new_peg = %new_peg,
            cost = %repeg.cost,
            "Price shock step evaluated"
        );

        scan.push(ShockStep {
            step,
            deviation,
            target_price,
            trade,
            shocked_market,
            new_peg,
            repeg,
        });
    }

    Ok(ShockScan {
        mark_price,
        terminal_price,
        steps: scan,
    })
}

/// Scan several markets one after another, results in input order
pub fn scan_markets<V: PositionValuation>(
    estimator: &CostEstimator<V>,
    markets: &[MarketState],
    steps: u32,
) -> Vec<Result<ShockScan>> {
    info!(markets = markets.len(), steps, "Starting price shock scan");
    markets
        .iter()
        .map(|market| scan_price_shocks(estimator, market, steps))
        .collect()
}

/// Scan several markets on the tokio blocking pool, results in input order
#[cfg(feature = "runtime")]
pub async fn scan_markets_parallel<V>(
    estimator: &CostEstimator<V>,
    markets: Vec<MarketState>,
    steps: u32,
) -> Result<Vec<Result<ShockScan>>>
where
    V: PositionValuation + Clone + Send + Sync + 'static,
{
    info!(markets = markets.len(), steps, "Starting parallel price shock scan");

    let count = markets.len();
    let mut tasks = tokio::task::JoinSet::new();
    for (index, market) in markets.into_iter().enumerate() {
        let estimator = estimator.clone();
        tasks.spawn_blocking(move || (index, scan_price_shocks(&estimator, &market, steps)));
    }

    let mut results: Vec<Option<Result<ShockScan>>> = (0..count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, scan) = joined.map_err(|e| CurveError::TaskFailed(e.to_string()))?;
        results[index] = Some(scan);
    }

    results
        .into_iter()
        .map(|scan| scan.ok_or_else(|| CurveError::TaskFailed("scan result missing".to_string())))
        .collect()
}
