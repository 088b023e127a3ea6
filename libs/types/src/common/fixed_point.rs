//! Scale-tagged fixed-point arithmetic for curve calculations
//!
//! All curve quantities are arbitrary-precision integers with an implied
//! power-of-ten scale carried in the type. `k × price_precision × peg` does not
//! fit in 128 bits for real markets, so the backing store is [`BigInt`].
//!
//! ## Design Principles
//!
//! - **Type Safety**: `Scaled<S>` only adds, subtracts and compares with `Scaled<S>`
//! - **Explicit Conversions**: every cross-scale product is a named method that
//!   applies the matching ratio from [`crate::precision`]
//! - **Floor Division**: all division rounds toward negative infinity; the loss
//!   is accepted and absorbed by the derived reserve
//! - **Transparency**: [`Scaled::to_decimal`] and `Display` are for reporting only

use crate::common::errors::{CurveError, Result};
use crate::precision::{
    InvariantScale, PegScale, PriceScale, QuoteScale, ReserveScale, Scale,
    AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO,
};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// Integer value with implied decimal scale `S`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scaled<S: Scale> {
    raw: BigInt,
    scale: PhantomData<S>,
}

/// Mark, terminal and limit prices (10^10)
pub type Price = Scaled<PriceScale>;
/// Peg multiplier (10^3)
pub type Peg = Scaled<PegScale>;
/// Quote amounts, costs and PnL (10^6)
pub type Quote = Scaled<QuoteScale>;
/// AMM reserves and the invariant root (10^13)
pub type Reserve = Scaled<ReserveScale>;
/// Signed base asset amounts share the reserve scale
pub type BaseAmount = Scaled<ReserveScale>;
/// Constant-product invariant `k` (10^26)
pub type Invariant = Scaled<InvariantScale>;

impl<S: Scale> Scaled<S> {
    /// Wrap an already-scaled integer
    pub fn from_raw(raw: impl Into<BigInt>) -> Self {
        Self {
            raw: raw.into(),
            scale: PhantomData,
        }
    }

    /// Whole units, e.g. `Peg::from_whole(40)` is a peg of 40.000
    pub fn from_whole(units: i64) -> Self {
        Self::from_raw(BigInt::from(units) * S::precision())
    }

    pub fn zero() -> Self {
        Self::from_raw(BigInt::zero())
    }

    /// 1.0 in this scale
    pub fn one() -> Self {
        Self::from_raw(S::precision())
    }

    /// Parse an exact decimal string ("123.456")
    ///
    /// Fails when the string carries more fractional digits than the scale holds.
    pub fn from_decimal_str(s: &str) -> Result<Self> {
        let decimal = Decimal::from_str(s)
            .map_err(|_| CurveError::invalid_input("from_decimal_str", format!("'{s}' is not a decimal")))?;
        let fractional = decimal.scale();
        if fractional > S::DECIMALS {
            return Err(CurveError::invalid_input(
                "from_decimal_str",
                format!("'{s}' has more than {} decimal places", S::DECIMALS),
            ));
        }
        let shift = BigInt::from(10u8).pow(S::DECIMALS - fractional);
        Ok(Self::from_raw(BigInt::from(decimal.mantissa()) * shift))
    }

    pub fn raw(&self) -> &BigInt {
        &self.raw
    }

    pub fn into_raw(self) -> BigInt {
        self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.raw.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.raw.is_negative()
    }

    pub fn abs(&self) -> Self {
        Self::from_raw(self.raw.abs())
    }

    /// Multiply by the dimensionless ratio `numerator / denominator` (floor)
    pub fn mul_div(&self, numerator: &BigInt, denominator: &BigInt) -> Result<Self> {
        if !denominator.is_positive() {
            return Err(CurveError::invalid_input(
                "mul_div",
                format!("denominator must be positive, got {denominator}"),
            ));
        }
        Ok(Self::from_raw((&self.raw * numerator).div_floor(denominator)))
    }

    /// Multiply by the ratio of two same-scale quantities (floor)
    pub fn mul_ratio<T: Scale>(&self, numerator: &Scaled<T>, denominator: &Scaled<T>) -> Result<Self> {
        self.mul_div(&numerator.raw, &denominator.raw)
    }

    /// Lossless when the value fits 96 bits of mantissa; intended for reporting
    pub fn to_decimal(&self) -> Result<Decimal> {
        let conversion_error = || CurveError::Conversion {
            value: self.raw.to_string(),
            decimals: S::DECIMALS,
        };
        let mantissa = self.raw.to_i128().ok_or_else(conversion_error)?;
        Decimal::try_from_i128_with_scale(mantissa, S::DECIMALS).map_err(|_| conversion_error())
    }
}

/// Exact decimal rendering without trailing zeros
impl<S: Scale> fmt::Display for Scaled<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.raw.abs().to_string();
        let decimals = S::DECIMALS as usize;
        let padded = format!("{digits:0>width$}", width = decimals + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
        let frac_part = frac_part.trim_end_matches('0');
        let sign = if self.raw.is_negative() { "-" } else { "" };
        if frac_part.is_empty() {
            write!(f, "{sign}{int_part}")
        } else {
            write!(f, "{sign}{int_part}.{frac_part}")
        }
    }
}

impl<S: Scale> fmt::Debug for Scaled<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", S::LABEL, self)
    }
}

impl<S: Scale> Default for Scaled<S> {
    fn default() -> Self {
        Self::zero()
    }
}

/// Serialised as the raw integer in a string so no precision is lost in JSON
impl<S: Scale> Serialize for Scaled<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        serializer.collect_str(&self.raw)
    }
}

impl<'de, S: Scale> Deserialize<'de> for Scaled<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigInt::from_str(&text)
            .map(Self::from_raw)
            .map_err(|_| D::Error::custom(format!("invalid raw {} value '{text}'", S::LABEL)))
    }
}

macro_rules! impl_same_scale_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<S: Scale> $trait for Scaled<S> {
            type Output = Scaled<S>;

            fn $method(self, rhs: Self) -> Self::Output {
                Scaled::from_raw(self.raw $op rhs.raw)
            }
        }

        impl<'a, S: Scale> $trait<&'a Scaled<S>> for &'a Scaled<S> {
            type Output = Scaled<S>;

            fn $method(self, rhs: &'a Scaled<S>) -> Self::Output {
                Scaled::from_raw(&self.raw $op &rhs.raw)
            }
        }
    };
}

impl_same_scale_op!(Add, add, +);
impl_same_scale_op!(Sub, sub, -);

impl<S: Scale> Neg for Scaled<S> {
    type Output = Scaled<S>;

    fn neg(self) -> Self::Output {
        Scaled::from_raw(-self.raw)
    }
}

impl<S: Scale> Neg for &Scaled<S> {
    type Output = Scaled<S>;

    fn neg(self) -> Self::Output {
        Scaled::from_raw(-&self.raw)
    }
}

/// Floor of the square root; exact for perfect squares
pub fn isqrt(value: &BigInt) -> Result<BigInt> {
    if value.is_negative() {
        return Err(CurveError::invalid_input(
            "isqrt",
            format!("cannot take the square root of {value}"),
        ));
    }
    Ok(value.sqrt())
}

// CROSS-SCALE CONVERSIONS - the only places two scales meet

impl Scaled<ReserveScale> {
    /// `reserve²` at invariant scale
    pub fn squared(&self) -> Invariant {
        Invariant::from_raw(&self.raw * &self.raw)
    }

    pub fn mul_reserve(&self, other: &Reserve) -> Invariant {
        Invariant::from_raw(&self.raw * &other.raw)
    }

    /// Quote value of a reserve-denominated amount at `peg`:
    /// `amount × peg / AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO`
    pub fn to_quote(&self, peg: &Peg) -> Quote {
        Quote::from_raw((&self.raw * &peg.raw).div_floor(&BigInt::from(AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO)))
    }
}

impl Scaled<QuoteScale> {
    /// Reserve-scale amount equivalent to this quote amount at `peg`:
    /// `amount × AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO / peg`
    pub fn to_reserve(&self, peg: &Peg) -> Result<Reserve> {
        if !peg.is_positive() {
            return Err(CurveError::invalid_input(
                "quote_to_reserve",
                format!("peg multiplier must be positive, got {peg}"),
            ));
        }
        let scaled = &self.raw * BigInt::from(AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO);
        Ok(Reserve::from_raw(scaled.div_floor(&peg.raw)))
    }

    /// Peg at which `reserve` is worth this quote amount (floor):
    /// `amount × AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO / reserve`
    ///
    /// The reserve may be negative; only zero is rejected.
    pub fn per_reserve(&self, reserve: &Reserve) -> Result<Peg> {
        if reserve.is_zero() {
            return Err(CurveError::invalid_state(
                "quote_per_reserve",
                "reserve delta is zero".to_string(),
            ));
        }
        let scaled = &self.raw * BigInt::from(AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO);
        Ok(Peg::from_raw(scaled.div_floor(&reserve.raw)))
    }
}

impl Scaled<InvariantScale> {
    /// `k / reserve`, the reserve on the other side of the curve
    pub fn div_reserve(&self, reserve: &Reserve) -> Result<Reserve> {
        if !reserve.is_positive() {
            return Err(CurveError::invalid_state(
                "invariant_div_reserve",
                format!("reserve must stay positive, got {reserve}"),
            ));
        }
        Ok(Reserve::from_raw(self.raw.div_floor(&reserve.raw)))
    }

    /// Reserve whose square is (at most) this invariant
    pub fn isqrt(&self) -> Result<Reserve> {
        isqrt(&self.raw).map(Reserve::from_raw)
    }
}

impl Scaled<PriceScale> {
    /// `quote × PRICE × peg / PEG / base`; a non-positive base yields price 0
    pub fn from_reserves(base: &Reserve, quote: &Reserve, peg: &Peg) -> Price {
        if !base.is_positive() {
            return Price::zero();
        }
        let numerator = &quote.raw * PriceScale::precision() * &peg.raw;
        let denominator = PegScale::precision() * &base.raw;
        Price::from_raw(numerator.div_floor(&denominator))
    }
}
