//! Run configuration and data directory layout.

use alpha101::{BacktestConfig, FeatureConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default data root when neither the flag, the environment nor the config
/// file names one.
pub(crate) const DEFAULT_DATA_ROOT: &str = "./data";

/// Contents of the optional TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) data_root: Option<PathBuf>,
    pub(crate) features: FeatureConfig,
    pub(crate) backtest: BacktestConfig,
}

impl AppConfig {
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Directory layout under the data root.
#[derive(Debug, Clone)]
pub(crate) struct DataDirs {
    root: PathBuf,
}

impl DataDirs {
    /// Flag or environment value first, then the config file, then
    /// [`DEFAULT_DATA_ROOT`].
    pub(crate) fn resolve(cli: Option<PathBuf>, config: &AppConfig) -> Self {
        let root = cli
            .or_else(|| config.data_root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT));
        Self { root }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Raw daily OHLCV, one CSV per symbol.
    pub(crate) fn klines(&self) -> PathBuf {
        self.root.join("klines_daily")
    }

    /// Feature frames, one CSV per symbol.
    pub(crate) fn features(&self) -> PathBuf {
        self.root.join("tmp_features")
    }

    /// Factor outputs, one CSV per factor.
    pub(crate) fn factors(&self) -> PathBuf {
        self.root.join("factors")
    }

    pub(crate) fn backtest(&self) -> PathBuf {
        self.root.join("backtest")
    }

    pub(crate) fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AppConfig::parse(
            r#"
            [backtest]
            quantiles = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.backtest.quantiles, 10);
        assert_eq!(config.backtest.horizon, 1);
        assert_eq!(config.backtest.min_ts_observations, 10);
        assert_eq!(config.features, FeatureConfig::default());
        assert!(config.data_root.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::parse(
            r#"
            data_root = "/srv/alpha"

            [features]
            adv_windows = [5, 20]

            [backtest]
            horizon = 5
            quantiles = 3
            min_ts_observations = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.features.adv_windows, vec![5, 20]);
        assert_eq!(config.backtest.horizon, 5);
        assert_eq!(config.data_root.as_deref(), Some(Path::new("/srv/alpha")));
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        assert!(AppConfig::parse("[backtest]\nhorizon = \"one\"").is_err());
    }

    #[test]
    fn test_data_root_precedence() {
        let config = AppConfig {
            data_root: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };
        let dirs = DataDirs::resolve(Some(PathBuf::from("/from/flag")), &config);
        assert_eq!(dirs.root(), Path::new("/from/flag"));

        let dirs = DataDirs::resolve(None, &config);
        assert_eq!(dirs.factors(), Path::new("/from/config/factors"));

        let dirs = DataDirs::resolve(None, &AppConfig::default());
        assert_eq!(dirs.klines(), Path::new("./data/klines_daily"));
    }
}
