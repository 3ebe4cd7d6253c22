//! Intermediate feature pre-pass.
//!
//! Adds the derived columns the formulas read (`returns`, `vwap` and
//! `adv{N}`) to a raw daily OHLCV frame, computed per symbol.

use crate::{Panel, Result, ops};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw columns the feature pass reads.
pub const RAW_COLUMNS: [&str; 8] = [
    "datetime", "symbol", "open", "high", "low", "close", "volume", "amount",
];

/// Configuration for the feature pre-pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Windows for the `adv{N}` average-volume columns
    pub adv_windows: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            adv_windows: vec![5, 10, 20, 30, 40, 60, 120, 150, 180],
        }
    }
}

/// Name of the average-volume column for `window`.
pub fn adv_column(window: usize) -> String {
    format!("adv{window}")
}

/// Build the feature frame from raw OHLCV rows.
///
/// The result is ordered by `(symbol, datetime)` and carries every input
/// column plus `returns`, `vwap` and one `adv{N}` per configured window.
pub fn build_features(raw: &DataFrame, config: &FeatureConfig) -> Result<DataFrame> {
    let panel = Panel::new(raw)?;
    panel.require(&RAW_COLUMNS)?;

    let close = panel.column("close")?;
    let volume = panel.column("volume")?;
    // Elementwise, so no per-symbol grouping is needed.
    let vwap = ops::vwap_from_amount(
        &close.to_vec(),
        &panel.column("high")?.to_vec(),
        &panel.column("low")?.to_vec(),
        &volume.to_vec(),
        &panel.column("amount")?.to_vec(),
    );

    let mut extra = vec![
        ("returns".to_string(), panel.per_symbol(close, ops::returns)),
        ("vwap".to_string(), Array1::from(vwap)),
    ];
    for &window in &config.adv_windows {
        extra.push((adv_column(window), panel.per_symbol(volume, |s| ops::adv(s, window))));
    }

    debug!(
        rows = panel.len(),
        symbols = panel.symbol_count(),
        adv_windows = config.adv_windows.len(),
        "built features"
    );
    panel.frame_with_columns(extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::df;

    fn raw() -> DataFrame {
        df! {
            "datetime" => ["2024-01-03", "2024-01-02", "2024-01-02", "2024-01-03", "2024-01-04"],
            "symbol" => ["A", "A", "B", "B", "B"],
            "open" => [10.0, 9.5, 20.0, 21.0, 22.0],
            "high" => [10.5, 10.0, 21.0, 22.0, 23.0],
            "low" => [9.8, 9.4, 19.5, 20.5, 21.0],
            "close" => [10.2, 9.9, 20.5, 21.5, 22.0],
            "volume" => [100.0, 200.0, 0.0, 400.0, 500.0],
            "amount" => [1020.0, 1980.0, 0.0, 8600.0, 11000.0],
        }
        .unwrap()
    }

    #[test]
    fn test_features_per_symbol() {
        let config = FeatureConfig {
            adv_windows: vec![2],
        };
        let out = build_features(&raw(), &config).unwrap();
        assert_eq!(out.height(), 5);

        let returns: Vec<Option<f64>> = out.column("returns").unwrap().f64().unwrap().into_iter().collect();
        // A: 9.9 -> 10.2; B starts fresh at 20.5
        assert_eq!(returns[0], None);
        assert_relative_eq!(returns[1].unwrap(), 10.2 / 9.9 - 1.0, epsilon = 1e-12);
        assert_eq!(returns[2], None);
        assert_relative_eq!(returns[3].unwrap(), 21.5 / 20.5 - 1.0, epsilon = 1e-12);

        let vwap: Vec<Option<f64>> = out.column("vwap").unwrap().f64().unwrap().into_iter().collect();
        assert_relative_eq!(vwap[0].unwrap(), 9.9, epsilon = 1e-12);
        // zero volume
        assert_eq!(vwap[2], None);

        let adv: Vec<Option<f64>> = out.column("adv2").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(adv[0], None);
        assert_eq!(adv[1], Some(150.0));
        assert_eq!(adv[2], None);
        assert_eq!(adv[3], Some(200.0));
        assert_eq!(adv[4], Some(450.0));
    }

    #[test]
    fn test_default_windows() {
        let out = build_features(&raw(), &FeatureConfig::default()).unwrap();
        for window in [5, 10, 20, 30, 40, 60, 120, 150, 180] {
            assert!(out.column(&adv_column(window)).is_ok());
        }
    }

    #[test]
    fn test_missing_raw_column() {
        let frame = raw().drop("amount").unwrap();
        assert!(matches!(
            build_features(&frame, &FeatureConfig::default()),
            Err(crate::FactorError::MissingColumn(c)) if c == "amount"
        ));
    }
}
