//! Backtest metrics engine.
//!
//! Evaluates a factor frame (`datetime, symbol, value`) against a price frame
//! (`datetime, symbol, close`):
//!
//! - [`make_forward_return`] builds per-symbol forward returns.
//! - [`ic_rankic`] computes daily cross-sectional IC and RankIC, their
//!   summary, and per-symbol time-series correlations.
//! - [`quantile_portfolios`] sorts each day into quantile buckets and tracks
//!   the equal-weighted bucket returns and the long-short spread.
//!
//! Nothing here returns an error. Empty or malformed input produces empty
//! reports with NaN aggregates and a `warn` event, so one bad factor never
//! aborts a batch.

pub mod forward;
pub mod ic;
pub mod quantile;
pub mod stats;

pub use forward::{ForwardReturns, make_forward_return};
pub use ic::{DailyIc, IcReport, IcSummary, SymbolIc, TsSummary, ic_rankic};
pub use quantile::{QuantileDay, QuantileReport, quantile_portfolios};

use crate::Panel;
use crate::panel::VALUE;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Backtest parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Forward return horizon in rows
    pub horizon: usize,
    /// Number of quantile buckets
    pub quantiles: usize,
    /// Minimum paired observations for a symbol's time-series IC
    pub min_ts_observations: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            horizon: 1,
            quantiles: 5,
            min_ts_observations: 10,
        }
    }
}

/// IC and quantile results for one factor.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    /// Cross-sectional and time-series correlation report
    pub ic: IcReport,
    /// Quantile portfolio report
    pub quantiles: QuantileReport,
}

impl BacktestReport {
    fn empty(config: &BacktestConfig) -> Self {
        Self {
            ic: IcReport::empty(),
            quantiles: QuantileReport::empty(config.quantiles),
        }
    }
}

/// Run the IC and quantile analyses, sharing one forward-return pass.
///
/// A zero horizon or fewer than two quantiles yields an empty report.
pub fn run_backtest(factor: &DataFrame, prices: &DataFrame, config: &BacktestConfig) -> BacktestReport {
    if config.horizon == 0 || config.quantiles < 2 {
        warn!(
            horizon = config.horizon,
            quantiles = config.quantiles,
            "invalid backtest parameters"
        );
        return BacktestReport::empty(config);
    }

    let Some(joined) = make_forward_return(prices, config.horizon).and_then(|fwd| Joined::new(factor, &fwd))
    else {
        return BacktestReport::empty(config);
    };

    let report = BacktestReport {
        ic: ic::from_joined(&joined, config.min_ts_observations),
        quantiles: quantile::from_joined(&joined, config.quantiles),
    };
    debug!(
        days = report.ic.summary.days,
        quantile_days = report.quantiles.days().len(),
        "backtest complete"
    );
    report
}

/// One factor value paired with its forward return, both defined.
#[derive(Debug, Clone)]
pub(crate) struct Observation {
    pub(crate) date: NaiveDate,
    pub(crate) symbol: String,
    pub(crate) value: f64,
    pub(crate) forward: f64,
}

/// Factor values inner-joined to forward returns on `(datetime, symbol)`,
/// ordered by `(symbol, datetime)`. Rows with either side undefined are
/// dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct Joined {
    rows: Vec<Observation>,
}

impl Joined {
    pub(crate) fn new(factor: &DataFrame, forward: &ForwardReturns) -> Option<Self> {
        if factor.height() == 0 {
            warn!("factor frame is empty");
            return None;
        }
        let panel = match Panel::new(factor) {
            Ok(panel) => panel,
            Err(e) => {
                warn!(error = %e, "invalid factor frame");
                return None;
            }
        };
        let values = match panel.column(VALUE) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "invalid factor frame");
                return None;
            }
        };

        let lookup = forward.lookup();
        let rows = panel
            .dates()
            .iter()
            .zip(values.iter())
            .enumerate()
            .filter(|(_, (_, value))| !value.is_nan())
            .filter_map(|(row, (&date, &value))| {
                let symbol = panel.symbol(row);
                lookup.get(&(date, symbol)).map(|&forward| Observation {
                    date,
                    symbol: symbol.to_string(),
                    value,
                    forward,
                })
            })
            .collect();
        Some(Self { rows })
    }

    /// Observations grouped by date, ascending; members in symbol order.
    pub(crate) fn by_date(&self) -> BTreeMap<NaiveDate, Vec<&Observation>> {
        let mut days: BTreeMap<NaiveDate, Vec<&Observation>> = BTreeMap::new();
        for obs in &self.rows {
            days.entry(obs.date).or_default().push(obs);
        }
        days
    }

    /// Observations grouped by symbol in panel order; each group is
    /// date-ordered.
    pub(crate) fn by_symbol(&self) -> Vec<(&str, &[Observation])> {
        self.rows
            .chunk_by(|a, b| a.symbol == b.symbol)
            .map(|group| (group[0].symbol.as_str(), group))
            .collect()
    }
}

/// Non-finite values become null in output frames.
pub(crate) fn nullable(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn prices() -> DataFrame {
        df! {
            "datetime" => ["2024-01-02", "2024-01-03", "2024-01-02", "2024-01-03"],
            "symbol" => ["A", "A", "B", "B"],
            "close" => [10.0, 11.0, 20.0, 19.0],
        }
        .unwrap()
    }

    #[test]
    fn test_join_drops_undefined_pairs() {
        let factor = df! {
            "datetime" => ["2024-01-02", "2024-01-02", "2024-01-03"],
            "symbol" => ["A", "B", "A"],
            "value" => [Some(1.0), None, Some(3.0)],
        }
        .unwrap();
        let fwd = make_forward_return(&prices(), 1).unwrap();
        let joined = Joined::new(&factor, &fwd).unwrap();
        // B has no value; A's last day has no forward return
        assert_eq!(joined.rows.len(), 1);
        assert_eq!(joined.rows[0].symbol, "A");
        assert!((joined.rows[0].forward - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_parameters_yield_empty_report() {
        let factor = df! {
            "datetime" => ["2024-01-02", "2024-01-02"],
            "symbol" => ["A", "B"],
            "value" => [1.0, 2.0],
        }
        .unwrap();
        for config in [
            BacktestConfig { horizon: 0, ..Default::default() },
            BacktestConfig { quantiles: 1, ..Default::default() },
        ] {
            let report = run_backtest(&factor, &prices(), &config);
            assert!(report.ic.daily.is_empty());
            assert!(report.ic.summary.ic_mean.is_nan());
            assert!(report.quantiles.days().is_empty());
        }
    }

    #[test]
    fn test_missing_value_column_yields_empty_report() {
        let factor = df! {
            "datetime" => ["2024-01-02"],
            "symbol" => ["A"],
        }
        .unwrap();
        let report = run_backtest(&factor, &prices(), &BacktestConfig::default());
        assert_eq!(report.ic.summary.days, 0);
        assert_eq!(report.ic.ts_summary.symbols, 0);
    }
}
