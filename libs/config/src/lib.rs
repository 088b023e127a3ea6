//! # Repeg Configuration
//!
//! Centralised settings for curve analysis runs.
//!
//! ## Features
//!
//! - **Cost Tolerance**: when the closed-form cross-check may disagree with the
//!   valuation-based cost before the run flags an anomaly
//! - **Scenario Scan**: number of price-shock steps per market
//! - **Logging**: level and format for the `tracing` subscriber
//!
//! ## Usage
//!
//! ```rust
//! use repeg_config::{logging::init_tracing, AnalysisConfig};
//!
//! let config = AnalysisConfig::default();
//! init_tracing(&config.logging).unwrap();
//! assert_eq!(config.scan.steps, 9);
//! ```

pub mod analysis_config;
pub mod logging;

// Re-export commonly used types
pub use analysis_config::{
    load_config, AnalysisConfig, LoggingSettings, ScanSettings, ToleranceSettings,
};
