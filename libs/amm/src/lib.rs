//! # Repeg AMM Library - Curve Parameter Economics
//!
//! ## Purpose
//!
//! Answers "what would it cost the protocol to change this curve?" for
//! constant-product vAMM perpetual markets. Projects swaps, peg changes and
//! depth rescales onto immutable curve snapshots, values the market's net open
//! interest against each projection, and solves the inverse problems: which
//! peg or depth ratio costs a given budget, and which trade moves the curve to
//! a given price.
//!
//! ## Integration Points
//!
//! - **Input Sources**: `MarketState` snapshots (curve reserves, peg and net open interest)
//! - **Output Destinations**: Repeg/adjust-K decision tooling, scenario reports
//! - **Valuation**: Pluggable through [`PositionValuation`]; [`ClosingSwapValuation`] by default
//! - **Precision**: Integer fixed point at the market's native scales, floor division throughout
//! - **Validation**: Non-positive reserves and divisors fail with `InvalidState`, never clamp
//!
//! ## Architecture Role
//!
//! ```text
//! curve_math ─► projector ─► terminal_price ─► cost ─► budget
//!                   │                           ▲        max_trade
//!                   └──────► valuation ─────────┘          │
//!                                                   scenario ◄┘
//! ```
//!
//! Every cost is reported twice: the authoritative valuation delta and an
//! independent closed form. Disagreement beyond [`CostTolerance`] is flagged
//! in the diagnostics and logged at warn level.

pub mod budget;
pub mod cost;
pub mod curve_math;
pub mod max_trade;
pub mod projector;
pub mod scenario;
pub mod terminal_price;
pub mod valuation;

pub use budget::{budgeted_depth_ratio, budgeted_peg, BudgetedDepth, DepthRatio};
pub use cost::{
    adjust_depth_formula_cost, repeg_formula_cost, CostEstimate, CostEstimator, CostTolerance,
    CrossCheck, DepthDiagnostics, RepegDiagnostics,
};
pub use curve_math::{resolve_swap_direction, swap};
pub use max_trade::{max_base_trade_to_price, MaxTrade};
pub use projector::{curve_after_swap, market_after_trade, reserves_after_swap, SwapAmount};
pub use scenario::{scan_markets, scan_price_shocks, ShockScan, ShockStep};
pub use terminal_price::terminal_price;
pub use valuation::{ClosingSwapValuation, PositionValuation};

#[cfg(feature = "runtime")]
pub use scenario::scan_markets_parallel;
