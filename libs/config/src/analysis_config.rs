//! Analysis Configuration Module
//!
//! Loads analysis settings from an optional TOML file with `REPEG_` prefixed
//! environment overrides (`REPEG_SCAN__STEPS=20`). Every section has defaults,
//! so an empty or missing file yields a usable configuration.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main analysis configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    /// Cross-check tolerance between valuation and closed-form costs
    #[serde(default)]
    pub tolerance: ToleranceSettings,

    /// Price-shock scenario scan
    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Allowed disagreement between the valuation cost and a closed-form cost
///
/// A discrepancy is an anomaly when it exceeds both the absolute floor and the
/// relative band around the valuation cost.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ToleranceSettings {
    /// Raw quote units (10^-6 USD)
    pub absolute_quote: i64,
    /// Basis points of the valuation cost
    pub relative_bps: u32,
}

impl Default for ToleranceSettings {
    fn default() -> Self {
        Self {
            absolute_quote: 1_000, // $0.001
            relative_bps: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScanSettings {
    /// Evenly spaced price deviations between mark and terminal price
    pub steps: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self { steps: 9 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. "info" or "repeg_amm=debug"
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`AnalysisConfig::load`] with an explicit environment map in place
    /// of the process environment
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading analysis config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // Override with environment variables (REPEG_ prefix)
        builder = builder.add_source(
            Environment::with_prefix("REPEG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let analysis: AnalysisConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        debug!(?analysis, "Analysis configuration loaded");
        Ok(analysis)
    }

    /// Reject settings no analysis run can use
    pub fn validate(&self) -> Result<()> {
        if self.scan.steps == 0 {
            bail!("scan.steps must be at least 1");
        }
        if self.tolerance.absolute_quote < 0 {
            bail!(
                "tolerance.absolute_quote must not be negative, got {}",
                self.tolerance.absolute_quote
            );
        }
        Ok(())
    }
}

/// Convenience function to load and validate configuration
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config = AnalysisConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_file_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("analysis.toml");

        let config_content = r#"
[tolerance]
absolute_quote = 5000
relative_bps = 25

[scan]
steps = 4

[logging]
level = "debug"
json = true
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = AnalysisConfig::load_with_env(Some(&config_path), Some(Map::new())).unwrap();

        assert_eq!(config.tolerance.absolute_quote, 5000);
        assert_eq!(config.tolerance.relative_bps, 25);
        assert_eq!(config.scan.steps, 4);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("analysis.toml");
        fs::write(&config_path, "[scan]\nsteps = 3\n").unwrap();

        let config = AnalysisConfig::load_with_env(Some(&config_path), Some(Map::new())).unwrap();
        assert_eq!(config.scan.steps, 3);
        assert_eq!(config.tolerance, ToleranceSettings::default());
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_environment_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("analysis.toml");
        fs::write(&config_path, "[scan]\nsteps = 3\n").unwrap();

        let mut env = Map::new();
        env.insert("REPEG_SCAN__STEPS".to_string(), "12".to_string());
        env.insert("REPEG_TOLERANCE__RELATIVE_BPS".to_string(), "50".to_string());

        let config = AnalysisConfig::load_with_env(Some(&config_path), Some(env)).unwrap();
        assert_eq!(config.scan.steps, 12);
        assert_eq!(config.tolerance.relative_bps, 50);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AnalysisConfig::load_with_env(Some(&missing), Some(Map::new())).is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = AnalysisConfig::default();
        assert!(config.validate().is_ok());

        config.scan.steps = 0;
        assert!(config.validate().is_err());

        config.scan.steps = 1;
        config.tolerance.absolute_quote = -1;
        assert!(config.validate().is_err());
    }
}
