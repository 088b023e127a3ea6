//! # Repeg Types Library
//!
//! Numeric model and snapshot types for constant-product vAMM analysis.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: quantities are arbitrary-precision scaled integers
//! - **Type Safety**: each precision scale is its own type, so a price cannot be
//!   added to a peg or a reserve divided by a quote amount without a named conversion
//! - **Immutable Snapshots**: curve and market states are values; projections
//!   return new ones
//! - **Clear Boundaries**: `Decimal` and `Display` exist for reporting only
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{CurveState, Peg, Reserve};
//!
//! let curve = CurveState::from_reserves(
//!     Reserve::from_whole(1_000_000),
//!     Reserve::from_whole(1_000_000),
//!     Peg::from_decimal_str("42.5").unwrap(),
//! )
//! .unwrap();
//! assert_eq!(curve.mark_price().to_string(), "42.5");
//! ```

pub mod common;
pub mod market;
pub mod precision;

pub use common::errors::{CurveError, Result};
pub use common::fixed_point::{isqrt, BaseAmount, Invariant, Peg, Price, Quote, Reserve, Scaled};
pub use market::{CurveState, InputAssetKind, MarketState, NetPosition, SwapDirection, TradeIntent};
pub use precision::{
    InvariantScale, PegScale, PriceScale, QuoteScale, ReserveScale, Scale,
    AMM_RESERVE_PRECISION, AMM_TIMES_PEG_TO_QUOTE_PRECISION_RATIO, AMM_TO_QUOTE_PRECISION_RATIO,
    MARK_PRICE_PRECISION, PEG_PRECISION, QUOTE_PRECISION,
};

// Re-exported so dependents build fixed-point values without naming num-bigint
pub use num_bigint::BigInt;
