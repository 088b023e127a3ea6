//! Precision constants and scale markers for vAMM quantities
//!
//! Every quantity on the curve is an integer carrying an implicit power-of-ten
//! scale. The scale depends on what the number measures, and combining two
//! numbers of different scales without the matching conversion ratio silently
//! produces values that are off by orders of magnitude.
//!
//! ## Scales
//!
//! | Quantity                     | Marker           | Decimals |
//! |------------------------------|------------------|----------|
//! | Mark / terminal / limit price | [`PriceScale`]   | 10       |
//! | Peg multiplier               | [`PegScale`]     | 3        |
//! | Quote asset (USDC)           | [`QuoteScale`]   | 6        |
//! | AMM reserves, base amounts   | [`ReserveScale`] | 13       |
//! | Invariant `k = sqrt_k²`      | [`InvariantScale`] | 26     |
//!
//! ## Conversion Ratios
//!
//! - [`AMM_TO_QUOTE_PRECISION_RATIO`]: reserve scale → quote scale (10^7)
//! - [`AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO`]: reserve × peg → quote (10^10)

use num_bigint::BigInt;
use std::fmt;
use std::hash::Hash;

pub const MARK_PRICE_PRECISION: u128 = 10_000_000_000;
pub const PEG_PRECISION: u128 = 1_000;
pub const QUOTE_PRECISION: u128 = 1_000_000;
pub const AMM_RESERVE_PRECISION: u128 = 10_000_000_000_000;
pub const INVARIANT_PRECISION: u128 = AMM_RESERVE_PRECISION * AMM_RESERVE_PRECISION;

/// Reserve-scale quantity → quote-scale quantity
pub const AMM_TO_QUOTE_PRECISION_RATIO: u128 = AMM_RESERVE_PRECISION / QUOTE_PRECISION;

/// (reserve-scale × peg-scale) → quote-scale
pub const AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO: u128 =
    AMM_RESERVE_PRECISION * PEG_PRECISION / QUOTE_PRECISION;

/// Compile-time tag naming the decimal scale of a [`crate::Scaled`] value
///
/// Markers are zero-sized; they exist so that `Scaled<PriceScale>` and
/// `Scaled<PegScale>` are different types.
pub trait Scale:
    Copy + Clone + fmt::Debug + Default + PartialEq + Eq + PartialOrd + Ord + Hash + Send + Sync + 'static
{
    /// Number of implied decimal places
    const DECIMALS: u32;
    /// Raw value representing 1.0
    const PRECISION: u128;
    /// Short label used by `Debug`
    const LABEL: &'static str;

    fn precision() -> BigInt {
        BigInt::from(Self::PRECISION)
    }
}

macro_rules! define_scale {
    ($(#[$meta:meta])* $name:ident, $decimals:expr, $precision:expr, $label:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name;

        impl Scale for $name {
            const DECIMALS: u32 = $decimals;
            const PRECISION: u128 = $precision;
            const LABEL: &'static str = $label;
        }
    };
}

define_scale!(
    /// Prices quoted in USD per base unit (10^10)
    PriceScale,
    10,
    MARK_PRICE_PRECISION,
    "Price"
);
define_scale!(
    /// Peg multiplier (10^3)
    PegScale,
    3,
    PEG_PRECISION,
    "Peg"
);
define_scale!(
    /// Quote asset amounts, costs and PnL (10^6)
    QuoteScale,
    6,
    QUOTE_PRECISION,
    "Quote"
);
define_scale!(
    /// AMM reserves, invariant root and base asset amounts (10^13)
    ReserveScale,
    13,
    AMM_RESERVE_PRECISION,
    "Reserve"
);
define_scale!(
    /// Product of two reserves (10^26)
    InvariantScale,
    26,
    INVARIANT_PRECISION,
    "Invariant"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_ratios() {
        assert_eq!(AMM_TO_QUOTE_PRECISION_RATIO, 10_000_000);
        assert_eq!(AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO, 10_000_000_000);
        assert_eq!(INVARIANT_PRECISION, 10u128.pow(26));
    }

    #[test]
    fn test_precision_matches_decimals() {
        fn check<S: Scale>() {
            assert_eq!(S::PRECISION, 10u128.pow(S::DECIMALS), "{}", S::LABEL);
        }
        check::<PriceScale>();
        check::<PegScale>();
        check::<QuoteScale>();
        check::<ReserveScale>();
        check::<InvariantScale>();
    }
}
