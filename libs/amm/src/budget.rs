//! Inverse solvers: which parameter change costs a given amount
//!
//! Both solvers invert a closed-form cost rather than the valuation cost, so
//! their answers are approximations. Re-verify with
//! [`CostEstimator`](crate::cost::CostEstimator) before acting on them.

use num_integer::Integer;
use tracing::{debug, warn};
use types::{
    BigInt, CurveError, Invariant, MarketState, Peg, Quote, Result, AMM_RESERVE_PRECISION,
    PEG_PRECISION, QUOTE_PRECISION,
};

/// Depth rescale `numerator / denominator`, reduced, denominator positive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthRatio {
    pub numerator: BigInt,
    pub denominator: BigInt,
}

impl DepthRatio {
    fn reduced(numerator: BigInt, denominator: BigInt) -> Self {
        let divisor = numerator.gcd(&denominator);
        Self {
            numerator: numerator / &divisor,
            denominator: denominator / &divisor,
        }
    }

    /// 1/1: depth unchanged
    pub fn identity() -> Self {
        Self {
            numerator: BigInt::from(1),
            denominator: BigInt::from(1),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.numerator == self.denominator
    }
}

/// Approximate depth ratio whose adjust-K cost is `target_cost`
///
/// Solves `y·d·(p/(x·p + d) − 1/(x + d))·Q = C` for `p`, which holds only when
/// the invariant is exactly `x·y`:
///
/// `p = d·(y·d·Q + C·(x + d)) / (y·d²·Q − C·x·(x + d))`
///
/// Both sides are lifted to a common integer scale so the ratio is exact for
/// the closed form. `invariant_gap` is the curve's departure from `k = x·y`;
/// when it is nonzero the valuation cost of the returned ratio will drift
/// from `target_cost`.
pub fn budgeted_depth_ratio(market: &MarketState, target_cost: &Quote) -> Result<BudgetedDepth> {
    let curve = &market.curve;
    let x = curve.base_reserve().raw();
    let y = curve.quote_reserve().raw();
    let d = market.net_base_open_interest.raw();
    let q = curve.peg_multiplier().raw();
    let c = target_cost.raw();
    let zero = BigInt::from(0);

    let invariant_gap = curve.invariant_gap();
    if !invariant_gap.is_zero() {
        warn!(
            invariant_gap = %invariant_gap,
            "Budgeted depth assumes k = x*y but the curve's invariant differs"
        );
    }

    if *d == zero {
        if target_cost.is_zero() {
            return Ok(BudgetedDepth {
                ratio: DepthRatio::identity(),
                invariant_gap,
            });
        }
        return Err(CurveError::invalid_state(
            "budgeted_depth_ratio",
            format!("no depth change costs {target_cost} without open interest"),
        ));
    }

    // Real-unit terms times R³·PEG·QUOTE
    let cost_scale = BigInt::from(AMM_RESERVE_PRECISION) * BigInt::from(PEG_PRECISION);
    let terminal_base = x + d;
    let exposure = y * d * q * BigInt::from(QUOTE_PRECISION);
    let numerator = d * (&exposure + c * &terminal_base * &cost_scale);
    let denominator = &exposure * d - c * x * &terminal_base * &cost_scale;

    if denominator == zero {
        return Err(CurveError::invalid_state(
            "budgeted_depth_ratio",
            format!("target cost {target_cost} is the asymptotic limit of any rescale"),
        ));
    }
    let (numerator, denominator) = if denominator < zero {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    if numerator <= zero {
        return Err(CurveError::invalid_state(
            "budgeted_depth_ratio",
            format!("no positive depth ratio costs {target_cost}"),
        ));
    }

    let ratio = DepthRatio::reduced(numerator, denominator);
    debug!(
        target_cost = %target_cost,
        numerator = %ratio.numerator,
        denominator = %ratio.denominator,
        "Budgeted depth ratio solved"
    );
    Ok(BudgetedDepth { ratio, invariant_gap })
}

/// Solved depth ratio and the assumption it was solved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetedDepth {
    pub ratio: DepthRatio,
    /// `k − x·y` of the curve; zero when the closed form is exact
    pub invariant_gap: Invariant,
}

/// Peg whose quote-reserve repeg formula cost is `target_cost`
///
/// With `Δy = k/(x + d) − y` the reserve the close would pull from the curve,
/// the formula is linear in the peg and inverts to
/// `new_peg = peg − C × AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO / Δy`.
/// The result lands within one peg unit of the exact solution.
pub fn budgeted_peg(market: &MarketState, target_cost: &Quote) -> Result<Peg> {
    let curve = &market.curve;
    let peg = curve.peg_multiplier();
    let terminal_base = curve.base_reserve() + &market.net_base_open_interest;
    let terminal_quote = curve.invariant().div_reserve(&terminal_base)?;
    let quote_reserve_delta = &terminal_quote - curve.quote_reserve();

    if quote_reserve_delta.is_zero() {
        if target_cost.is_zero() {
            return Ok(peg.clone());
        }
        return Err(CurveError::invalid_state(
            "budgeted_peg",
            format!("no peg change costs {target_cost} when closing moves no quote reserve"),
        ));
    }

    let peg_delta = target_cost.per_reserve(&quote_reserve_delta)?;
    let new_peg = peg - &peg_delta;
    if !new_peg.is_positive() {
        return Err(CurveError::invalid_state(
            "budgeted_peg",
            format!("target cost {target_cost} needs peg {new_peg}"),
        ));
    }

    debug!(
        target_cost = %target_cost,
        old_peg = %peg,
        new_peg = %new_peg,
        "Budgeted peg solved"
    );
    Ok(new_peg)
}
