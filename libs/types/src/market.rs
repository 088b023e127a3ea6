//! Curve and market snapshots
//!
//! Snapshots are immutable values handed in by whatever fetched them from the
//! ledger. Every projection builds a new snapshot; nothing here is mutated in
//! place, and "before" and "after" states never share mutable structure.

use crate::common::errors::{CurveError, Result};
use crate::common::fixed_point::{BaseAmount, Invariant, Peg, Price, Quote, Reserve};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Constant-product curve state
///
/// `base_reserve × quote_reserve ≈ sqrt_k²`, with the floor-division loss of the
/// last projection absorbed by whichever reserve was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CurveStateFields")]
pub struct CurveState {
    base_reserve: Reserve,
    quote_reserve: Reserve,
    sqrt_k: Reserve,
    peg_multiplier: Peg,
}

/// Unvalidated wire shape; validated through [`CurveState::new`]
#[derive(Deserialize)]
struct CurveStateFields {
    base_reserve: Reserve,
    quote_reserve: Reserve,
    sqrt_k: Reserve,
    peg_multiplier: Peg,
}

impl TryFrom<CurveStateFields> for CurveState {
    type Error = CurveError;

    fn try_from(fields: CurveStateFields) -> Result<Self> {
        CurveState::new(
            fields.base_reserve,
            fields.quote_reserve,
            fields.sqrt_k,
            fields.peg_multiplier,
        )
    }
}

impl CurveState {
    /// Validated constructor: reserves, invariant root and peg must be positive
    pub fn new(base_reserve: Reserve, quote_reserve: Reserve, sqrt_k: Reserve, peg_multiplier: Peg) -> Result<Self> {
        for (name, value) in [
            ("base_reserve", &base_reserve),
            ("quote_reserve", &quote_reserve),
            ("sqrt_k", &sqrt_k),
        ] {
            if !value.is_positive() {
                return Err(CurveError::invalid_state(
                    "curve_state",
                    format!("{name} must be positive, got {value}"),
                ));
            }
        }
        if !peg_multiplier.is_positive() {
            return Err(CurveError::invalid_state(
                "curve_state",
                format!("peg_multiplier must be positive, got {peg_multiplier}"),
            ));
        }
        Ok(Self {
            base_reserve,
            quote_reserve,
            sqrt_k,
            peg_multiplier,
        })
    }

    /// Balanced curve whose invariant root equals the geometric mean of the reserves
    ///
    /// Convenient for fixtures and for callers that only know the two reserves.
    pub fn from_reserves(base_reserve: Reserve, quote_reserve: Reserve, peg_multiplier: Peg) -> Result<Self> {
        let sqrt_k = base_reserve.mul_reserve(&quote_reserve).isqrt()?;
        Self::new(base_reserve, quote_reserve, sqrt_k, peg_multiplier)
    }

    pub fn base_reserve(&self) -> &Reserve {
        &self.base_reserve
    }

    pub fn quote_reserve(&self) -> &Reserve {
        &self.quote_reserve
    }

    pub fn sqrt_k(&self) -> &Reserve {
        &self.sqrt_k
    }

    pub fn peg_multiplier(&self) -> &Peg {
        &self.peg_multiplier
    }

    /// `k = sqrt_k²`
    pub fn invariant(&self) -> Invariant {
        self.sqrt_k.squared()
    }

    /// `k − base × quote`; zero when the invariant is the exact reserve product
    pub fn invariant_gap(&self) -> Invariant {
        &self.invariant() - &self.base_reserve.mul_reserve(&self.quote_reserve)
    }

    /// Price implied by the current reserves and peg
    pub fn mark_price(&self) -> Price {
        Price::from_reserves(&self.base_reserve, &self.quote_reserve, &self.peg_multiplier)
    }

    /// Same reserves, new peg
    pub fn with_peg(&self, peg_multiplier: Peg) -> Result<Self> {
        if !peg_multiplier.is_positive() {
            return Err(CurveError::invalid_input(
                "with_peg",
                format!("peg multiplier must be positive, got {peg_multiplier}"),
            ));
        }
        Self::new(
            self.base_reserve.clone(),
            self.quote_reserve.clone(),
            self.sqrt_k.clone(),
            peg_multiplier,
        )
    }

    /// Same invariant root and peg, new reserves (result of a swap)
    pub fn with_reserves(&self, base_reserve: Reserve, quote_reserve: Reserve) -> Result<Self> {
        Self::new(
            base_reserve,
            quote_reserve,
            self.sqrt_k.clone(),
            self.peg_multiplier.clone(),
        )
    }

    /// Uniform depth rescale by `numerator / denominator`
    ///
    /// Base reserve, quote reserve and invariant root are each rescaled on their
    /// own (not re-derived from each other). The reserve ratio, and so the price,
    /// is kept up to rounding while `k` moves by `(numerator / denominator)²`.
    pub fn with_rescaled_depth(&self, numerator: &BigInt, denominator: &BigInt) -> Result<Self> {
        if numerator.sign() != num_bigint::Sign::Plus || denominator.sign() != num_bigint::Sign::Plus {
            return Err(CurveError::invalid_input(
                "with_rescaled_depth",
                format!("rescale ratio {numerator}/{denominator} must be positive"),
            ));
        }
        Self::new(
            self.base_reserve.mul_div(numerator, denominator)?,
            self.quote_reserve.mul_div(numerator, denominator)?,
            self.sqrt_k.mul_div(numerator, denominator)?,
            self.peg_multiplier.clone(),
        )
    }
}

/// Curve plus the net base exposure of every participant trading against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    pub curve: CurveState,
    /// Positive when participants are net long base
    pub net_base_open_interest: BaseAmount,
}

impl MarketState {
    pub fn new(curve: CurveState, net_base_open_interest: BaseAmount) -> Self {
        Self {
            curve,
            net_base_open_interest,
        }
    }

    /// Same open interest against a different curve
    pub fn with_curve(&self, curve: CurveState) -> Self {
        Self {
            curve,
            net_base_open_interest: self.net_base_open_interest.clone(),
        }
    }

    /// Whole-market exposure as a single position with no entry value yet
    pub fn net_position(&self) -> NetPosition {
        NetPosition {
            base_amount: self.net_base_open_interest.clone(),
            quote_amount: Quote::zero(),
            cumulative_funding_snapshot: Quote::zero(),
        }
    }
}

/// One side's exposure, used to value the entire net open interest at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPosition {
    pub base_amount: BaseAmount,
    /// Entry value of the position in quote
    pub quote_amount: Quote,
    /// Funding index the position was last settled at; carried, never applied
    pub cumulative_funding_snapshot: Quote,
}

impl NetPosition {
    pub fn with_quote_amount(&self, quote_amount: Quote) -> Self {
        Self {
            quote_amount,
            ..self.clone()
        }
    }
}

/// Whether a swap grows or shrinks the reserve being supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    Add,
    Remove,
}

/// Which reserve the caller supplies directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAssetKind {
    Base,
    Quote,
}

/// Directional intent of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeIntent {
    Long,
    Short,
}

impl TradeIntent {
    pub fn opposite(self) -> Self {
        match self {
            TradeIntent::Long => TradeIntent::Short,
            TradeIntent::Short => TradeIntent::Long,
        }
    }

    /// Intent that closes a net exposure of the given sign
    pub fn to_close(base_amount: &BaseAmount) -> Self {
        if base_amount.is_positive() {
            TradeIntent::Short
        } else {
            TradeIntent::Long
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> CurveState {
        CurveState::new(
            Reserve::from_whole(1000),
            Reserve::from_whole(1000),
            Reserve::from_whole(1000),
            Peg::one(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_non_positive_fields() {
        let bad = CurveState::new(Reserve::zero(), Reserve::from_whole(1), Reserve::from_whole(1), Peg::one());
        assert!(matches!(bad, Err(CurveError::InvalidState { .. })));

        let bad_peg = CurveState::new(
            Reserve::from_whole(1),
            Reserve::from_whole(1),
            Reserve::from_whole(1),
            Peg::from_raw(-1),
        );
        assert!(bad_peg.is_err());
    }

    #[test]
    fn test_with_peg_leaves_reserves_untouched() {
        let original = curve();
        let repegged = original.with_peg(Peg::from_whole(2)).unwrap();
        assert_eq!(repegged.base_reserve(), original.base_reserve());
        assert_eq!(repegged.quote_reserve(), original.quote_reserve());
        assert_eq!(repegged.sqrt_k(), original.sqrt_k());
        assert_eq!(repegged.peg_multiplier(), &Peg::from_whole(2));
        assert_eq!(original.peg_multiplier(), &Peg::one());

        assert!(matches!(original.with_peg(Peg::zero()), Err(CurveError::InvalidInput { .. })));
    }

    #[test]
    fn test_rescaled_depth_keeps_price() {
        let original = curve();
        let deeper = original
            .with_rescaled_depth(&BigInt::from(3), &BigInt::from(2))
            .unwrap();
        assert_eq!(deeper.base_reserve(), &Reserve::from_whole(1500));
        assert_eq!(deeper.sqrt_k(), &Reserve::from_whole(1500));
        assert_eq!(deeper.mark_price(), original.mark_price());

        assert!(original.with_rescaled_depth(&BigInt::from(1), &BigInt::from(0)).is_err());
        assert!(original.with_rescaled_depth(&BigInt::from(-1), &BigInt::from(2)).is_err());
    }

    #[test]
    fn test_rescale_to_zero_is_invalid_state() {
        let tiny = CurveState::new(Reserve::from_raw(1), Reserve::from_raw(1), Reserve::from_raw(1), Peg::one()).unwrap();
        let shrunk = tiny.with_rescaled_depth(&BigInt::from(1), &BigInt::from(2));
        assert!(matches!(shrunk, Err(CurveError::InvalidState { .. })));
    }

    #[test]
    fn test_invariant_gap() {
        assert_eq!(curve().invariant_gap(), crate::Invariant::zero());

        let skewed = CurveState::new(Reserve::from_raw(3), Reserve::from_raw(3), Reserve::from_raw(4), Peg::one()).unwrap();
        assert_eq!(skewed.invariant_gap(), crate::Invariant::from_raw(7));
    }

    #[test]
    fn test_close_intent() {
        assert_eq!(TradeIntent::to_close(&BaseAmount::from_whole(5)), TradeIntent::Short);
        assert_eq!(TradeIntent::to_close(&BaseAmount::from_whole(-5)), TradeIntent::Long);
        assert_eq!(TradeIntent::to_close(&BaseAmount::zero()), TradeIntent::Long);
        assert_eq!(TradeIntent::Long.opposite(), TradeIntent::Short);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"base_reserve":"0","quote_reserve":"10","sqrt_k":"10","peg_multiplier":"1000"}"#;
        assert!(serde_json::from_str::<CurveState>(json).is_err());

        let json = r#"{"base_reserve":"10","quote_reserve":"10","sqrt_k":"10","peg_multiplier":"1000"}"#;
        let curve: CurveState = serde_json::from_str(json).unwrap();
        assert_eq!(curve.peg_multiplier(), &Peg::one());
    }
}
