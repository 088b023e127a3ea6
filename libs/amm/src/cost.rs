//! Repeg and adjust-K cost estimation
//!
//! The authoritative cost of a curve change is the PnL delta of the market's
//! whole net open interest, valued as one position before and after the change.
//! Each estimate also evaluates an independent closed-form formula and reports
//! how far the two disagree; a disagreement beyond tolerance is logged as an
//! anomaly and flagged in the diagnostics but never replaces the valuation cost.

use crate::terminal_price::terminal_price;
use crate::valuation::{ClosingSwapValuation, PositionValuation};
use config::ToleranceSettings;
use tracing::{debug, warn};
use types::{BigInt, CurveError, CurveState, Invariant, MarketState, Peg, Price, Quote, Result};

/// Allowed disagreement between valuation and closed-form costs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTolerance {
    /// Floor below which any discrepancy is rounding noise
    pub absolute: Quote,
    /// Band around the valuation cost, in basis points
    pub relative_bps: u32,
}

impl CostTolerance {
    pub fn new(absolute: Quote, relative_bps: u32) -> Self {
        Self {
            absolute,
            relative_bps,
        }
    }

    pub fn from_settings(settings: &ToleranceSettings) -> Self {
        Self::new(Quote::from_raw(settings.absolute_quote), settings.relative_bps)
    }

    /// Whether `discrepancy` is within tolerance of `reference`
    pub fn allows(&self, reference: &Quote, discrepancy: &Quote) -> bool {
        let band = reference
            .abs()
            .mul_div(&BigInt::from(self.relative_bps), &BigInt::from(10_000))
            .unwrap_or_else(|_| Quote::zero());
        let limit = if band > self.absolute { band } else { self.absolute.clone() };
        discrepancy.abs() <= limit
    }
}

impl Default for CostTolerance {
    fn default() -> Self {
        Self::from_settings(&ToleranceSettings::default())
    }
}

/// Closed-form cost next to the valuation cost it cross-checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCheck {
    pub formula_cost: Quote,
    /// `valuation_cost − formula_cost`
    pub discrepancy: Quote,
    /// Discrepancy exceeds the configured tolerance
    pub anomaly: bool,
}

impl CrossCheck {
    fn evaluate(cost: &Quote, formula_cost: Quote, tolerance: &CostTolerance) -> Self {
        let discrepancy = cost - &formula_cost;
        let anomaly = !tolerance.allows(cost, &discrepancy);
        Self {
            formula_cost,
            discrepancy,
            anomaly,
        }
    }
}

/// Figures reported alongside a repeg cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepegDiagnostics {
    pub old_peg: Peg,
    pub new_peg: Peg,
    pub old_mark_price: Price,
    pub new_mark_price: Price,
    pub old_terminal_price: Price,
    pub new_terminal_price: Price,
    pub cross_check: CrossCheck,
}

/// Figures reported alongside an adjust-K cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthDiagnostics {
    pub numerator: BigInt,
    pub denominator: BigInt,
    pub old_invariant: Invariant,
    pub new_invariant: Invariant,
    /// `k − x·y` of the original curve; the closed form assumes zero
    pub invariant_gap: Invariant,
    pub cross_check: CrossCheck,
}

/// Valuation-based cost plus its diagnostics
///
/// A positive cost is PnL gained by the net open interest, i.e. paid by the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEstimate<D> {
    pub cost: Quote,
    pub diagnostics: D,
}

/// Estimates what a curve parameter change costs the protocol
#[derive(Debug, Clone)]
pub struct CostEstimator<V = ClosingSwapValuation> {
    valuation: V,
    tolerance: CostTolerance,
}

impl CostEstimator<ClosingSwapValuation> {
    pub fn new(tolerance: CostTolerance) -> Self {
        Self::with_valuation(ClosingSwapValuation, tolerance)
    }
}

impl Default for CostEstimator<ClosingSwapValuation> {
    fn default() -> Self {
        Self::new(CostTolerance::default())
    }
}

impl<V: PositionValuation> CostEstimator<V> {
    pub fn with_valuation(valuation: V, tolerance: CostTolerance) -> Self {
        Self {
            valuation,
            tolerance,
        }
    }

    pub fn tolerance(&self) -> &CostTolerance {
        &self.tolerance
    }

    pub fn valuation(&self) -> &V {
        &self.valuation
    }

    /// Cost of moving the peg multiplier to `new_peg`
    pub fn repeg_cost(&self, market: &MarketState, new_peg: &Peg) -> Result<CostEstimate<RepegDiagnostics>> {
        let new_curve = market.curve.with_peg(new_peg.clone())?;
        let cost = self.valuation_delta(market, &new_curve)?;
        let formula_cost = repeg_formula_cost(market, new_peg)?;
        let cross_check = CrossCheck::evaluate(&cost, formula_cost, &self.tolerance);

        let diagnostics = RepegDiagnostics {
            old_peg: market.curve.peg_multiplier().clone(),
            new_peg: new_peg.clone(),
            old_mark_price: market.curve.mark_price(),
            new_mark_price: new_curve.mark_price(),
            old_terminal_price: terminal_price(market)?,
            new_terminal_price: terminal_price(&market.with_curve(new_curve))?,
            cross_check,
        };

        debug!(
            old_peg = %diagnostics.old_peg,
            new_peg = %diagnostics.new_peg,
            old_mark_price = %diagnostics.old_mark_price,
            new_mark_price = %diagnostics.new_mark_price,
            old_terminal_price = %diagnostics.old_terminal_price,
            new_terminal_price = %diagnostics.new_terminal_price,
            cost = %cost,
            formula_cost = %diagnostics.cross_check.formula_cost,
            "Repeg cost estimated"
        );
        if diagnostics.cross_check.anomaly {
            warn!(
                cost = %cost,
                formula_cost = %diagnostics.cross_check.formula_cost,
                discrepancy = %diagnostics.cross_check.discrepancy,
                "Repeg cost disagrees with quote-reserve formula beyond tolerance"
            );
        }

        Ok(CostEstimate { cost, diagnostics })
    }

    /// Cost of rescaling curve depth by `numerator / denominator`
    pub fn adjust_depth_cost(
        &self,
        market: &MarketState,
        numerator: &BigInt,
        denominator: &BigInt,
    ) -> Result<CostEstimate<DepthDiagnostics>> {
        let new_curve = market.curve.with_rescaled_depth(numerator, denominator)?;
        let cost = self.valuation_delta(market, &new_curve)?;
        let formula_cost = adjust_depth_formula_cost(market, numerator, denominator)?;
        let cross_check = CrossCheck::evaluate(&cost, formula_cost, &self.tolerance);

        let diagnostics = DepthDiagnostics {
            numerator: numerator.clone(),
            denominator: denominator.clone(),
            old_invariant: market.curve.invariant(),
            new_invariant: new_curve.invariant(),
            invariant_gap: market.curve.invariant_gap(),
            cross_check,
        };

        debug!(
            old_k = %diagnostics.old_invariant,
            new_k = %diagnostics.new_invariant,
            cost = %cost,
            formula_cost = %diagnostics.cross_check.formula_cost,
            "Adjust-K cost estimated"
        );
        if diagnostics.cross_check.anomaly {
            warn!(
                cost = %cost,
                formula_cost = %diagnostics.cross_check.formula_cost,
                discrepancy = %diagnostics.cross_check.discrepancy,
                invariant_gap = %diagnostics.invariant_gap,
                "Adjust-K cost disagrees with k = x*y formula beyond tolerance"
            );
        }

        Ok(CostEstimate { cost, diagnostics })
    }

    /// PnL of the net open interest, entered at the current curve, against `projected`
    fn valuation_delta(&self, market: &MarketState, projected: &CurveState) -> Result<Quote> {
        let position = market.net_position();
        let entry_value = self.valuation.base_asset_value(&market.curve, &position)?;
        let position = position.with_quote_amount(entry_value);
        self.valuation.position_pnl(projected, &position)
    }
}

/// Repeg cost from the quote reserve the curve would need to absorb the close
///
/// `(k / (x + d) − y) × (old_peg − new_peg) / AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO`
pub fn repeg_formula_cost(market: &MarketState, new_peg: &Peg) -> Result<Quote> {
    let curve = &market.curve;
    let terminal_base = curve.base_reserve() + &market.net_base_open_interest;
    let terminal_quote = curve.invariant().div_reserve(&terminal_base)?;
    let quote_reserve_delta = &terminal_quote - curve.quote_reserve();
    let peg_change = curve.peg_multiplier() - new_peg;
    Ok(quote_reserve_delta.to_quote(&peg_change))
}

/// Adjust-K cost in closed form, assuming `k = x·y`
///
/// With `k` replaced by the reserve product, the cost of rescaling depth by
/// `p = numerator / denominator` collapses to
/// `y·d·(p/(x·p + d) − 1/(x + d)) × peg / AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO`.
/// It matches the valuation cost only while the curve's invariant really is the
/// reserve product; [`crate::budget::budgeted_depth_ratio`] inverts this form.
pub fn adjust_depth_formula_cost(market: &MarketState, numerator: &BigInt, denominator: &BigInt) -> Result<Quote> {
    if *numerator <= BigInt::from(0) {
        return Err(CurveError::invalid_input(
            "adjust_depth_formula_cost",
            format!("numerator must be positive, got {numerator}"),
        ));
    }
    let curve = &market.curve;
    let x = curve.base_reserve();
    let d = &market.net_base_open_interest;

    // y·d at invariant scale; dividing by a reserve brings it back to reserve scale
    let exposure = curve.quote_reserve().mul_reserve(d);
    let rescaled_terminal_base = &x.mul_div(numerator, denominator)? + d;
    let rescaled_term = exposure.mul_div(numerator, denominator)?.div_reserve(&rescaled_terminal_base)?;
    let current_term = exposure.div_reserve(&(x + d))?;

    Ok((&rescaled_term - &current_term).to_quote(curve.peg_multiplier()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BaseAmount, Reserve};

    fn estimator() -> CostEstimator {
        CostEstimator::new(CostTolerance::default())
    }

    fn market(open_interest: i64) -> MarketState {
        MarketState::new(
            CurveState::from_reserves(
                Reserve::from_whole(1_000_000),
                Reserve::from_whole(1_000_000),
                Peg::from_whole(40),
            )
            .unwrap(),
            BaseAmount::from_whole(open_interest),
        )
    }

    #[test]
    fn test_tolerance_band() {
        let tolerance = CostTolerance::new(Quote::from_raw(100), 10);
        assert!(tolerance.allows(&Quote::zero(), &Quote::from_raw(100)));
        assert!(!tolerance.allows(&Quote::zero(), &Quote::from_raw(-101)));
        // 10 bps of $1000 is $1
        assert!(tolerance.allows(&Quote::from_whole(1000), &Quote::from_whole(1)));
        assert!(!tolerance.allows(&Quote::from_whole(1000), &Quote::from_raw(1_000_001)));
    }

    #[test]
    fn test_repeg_noop_costs_nothing() {
        let estimator = estimator();
        let market = market(5_000);
        let estimate = estimator
            .repeg_cost(&market, market.curve.peg_multiplier())
            .unwrap();
        assert_eq!(estimate.cost, Quote::zero());
        assert_eq!(estimate.diagnostics.cross_check.formula_cost, Quote::zero());
        assert!(!estimate.diagnostics.cross_check.anomaly);
        assert_eq!(estimate.diagnostics.old_mark_price, estimate.diagnostics.new_mark_price);
    }

    #[test]
    fn test_repeg_up_costs_protocol_when_net_long() {
        let estimator = estimator();
        let market = market(5_000);
        let estimate = estimator.repeg_cost(&market, &Peg::from_whole(41)).unwrap();

        assert!(estimate.cost.is_positive());
        assert!(!estimate.diagnostics.cross_check.anomaly, "{:?}", estimate.diagnostics);
        assert!(estimate.diagnostics.new_mark_price > estimate.diagnostics.old_mark_price);
        assert!(estimate.diagnostics.new_terminal_price > estimate.diagnostics.old_terminal_price);
    }

    #[test]
    fn test_repeg_up_pays_protocol_when_net_short() {
        let estimator = estimator();
        let estimate = estimator.repeg_cost(&market(-5_000), &Peg::from_whole(41)).unwrap();
        assert!(estimate.cost.is_negative());
        assert!(!estimate.diagnostics.cross_check.anomaly);
    }

    #[test]
    fn test_repeg_flat_market_is_free() {
        let estimate = estimator()
            .repeg_cost(&market(0), &Peg::from_whole(80))
            .unwrap();
        assert_eq!(estimate.cost, Quote::zero());
        assert_eq!(estimate.diagnostics.cross_check.formula_cost, Quote::zero());
    }

    #[test]
    fn test_repeg_rejects_non_positive_peg() {
        let result = estimator().repeg_cost(&market(10), &Peg::zero());
        assert!(matches!(result, Err(CurveError::InvalidInput { .. })));
    }

    #[test]
    fn test_adjust_depth_noop_costs_nothing() {
        let estimate = estimator()
            .adjust_depth_cost(&market(5_000), &BigInt::from(7), &BigInt::from(7))
            .unwrap();
        assert_eq!(estimate.cost, Quote::zero());
        assert_eq!(estimate.diagnostics.cross_check.formula_cost, Quote::zero());
        assert_eq!(estimate.diagnostics.old_invariant, estimate.diagnostics.new_invariant);
    }

    #[test]
    fn test_adjust_depth_agrees_with_formula_on_exact_curve() {
        let market = market(5_000);
        assert!(market.curve.invariant_gap().is_zero());

        let estimate = estimator()
            .adjust_depth_cost(&market, &BigInt::from(11), &BigInt::from(10))
            .unwrap();

        // Deepening the curve raises the net long's exit value: protocol pays
        assert!(estimate.cost.is_positive());
        assert!(!estimate.diagnostics.cross_check.anomaly, "{:?}", estimate.diagnostics);
        assert!(estimate.diagnostics.new_invariant > estimate.diagnostics.old_invariant);
    }

    #[test]
    fn test_adjust_depth_flags_broken_product_assumption() {
        // k far above x*y: the closed form no longer describes the curve
        let curve = CurveState::new(
            Reserve::from_whole(1_000_000),
            Reserve::from_whole(1_000_000),
            Reserve::from_whole(1_200_000),
            Peg::from_whole(40),
        )
        .unwrap();
        let market = MarketState::new(curve, BaseAmount::from_whole(50_000));

        let estimate = estimator()
            .adjust_depth_cost(&market, &BigInt::from(2), &BigInt::from(1))
            .unwrap();
        assert!(estimate.diagnostics.invariant_gap.is_positive());
        assert!(estimate.diagnostics.cross_check.anomaly);
    }

    #[test]
    fn test_adjust_depth_rejects_bad_ratio() {
        let estimator = estimator();
        let market = market(5_000);
        assert!(matches!(
            estimator.adjust_depth_cost(&market, &BigInt::from(1), &BigInt::from(0)),
            Err(CurveError::InvalidInput { .. })
        ));
        assert!(matches!(
            estimator.adjust_depth_cost(&market, &BigInt::from(0), &BigInt::from(1)),
            Err(CurveError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_open_interest_larger_than_pool_is_invalid_state() {
        let result = estimator().repeg_cost(&market(-1_000_000), &Peg::from_whole(41));
        assert!(matches!(result, Err(CurveError::InvalidState { .. })));
    }
}
