//! Forward return construction.

use crate::panel::{DATETIME, SYMBOL};
use crate::{Panel, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::warn;

/// Name of the forward-return column.
pub const FORWARD_RETURN: &str = "fwd_ret";

/// Per-row forward returns keyed by `(datetime, symbol)`.
///
/// Ordered by `(symbol, datetime)`. The value at `t` is the return realised
/// between `t` and `t + horizon`; each symbol's last `horizon` rows are NaN.
#[derive(Debug, Clone)]
pub struct ForwardReturns {
    horizon: usize,
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    values: Vec<f64>,
}

impl ForwardReturns {
    /// Horizon in rows.
    pub const fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forward return values in `(symbol, datetime)` order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(datetime, symbol, value)` rows.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &str, f64)> {
        self.dates
            .iter()
            .zip(&self.symbols)
            .zip(&self.values)
            .map(|((d, s), v)| (*d, s.as_str(), *v))
    }

    /// Index of the defined returns by `(datetime, symbol)`.
    pub(crate) fn lookup(&self) -> HashMap<(NaiveDate, &str), f64> {
        self.iter()
            .filter(|(_, _, v)| !v.is_nan())
            .map(|(d, s, v)| ((d, s), v))
            .collect()
    }

    /// `datetime, symbol, fwd_ret` frame; undefined returns are null.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let values: Vec<Option<f64>> = self
            .values
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect();
        let frame = DataFrame::new(vec![
            Column::new(DATETIME.into(), self.dates.clone()),
            Column::new(SYMBOL.into(), self.symbols.clone()),
            Column::new(FORWARD_RETURN.into(), values),
        ])?;
        Ok(frame)
    }
}

/// Forward returns over `horizon` rows, computed within each symbol.
///
/// `prices` needs `datetime`, `symbol` and `close`. Returns `None` (with a
/// warning) for a zero horizon, an empty frame or a malformed one.
pub fn make_forward_return(prices: &DataFrame, horizon: usize) -> Option<ForwardReturns> {
    if horizon == 0 {
        warn!("forward return horizon must be positive");
        return None;
    }
    if prices.height() == 0 {
        warn!("price frame is empty");
        return None;
    }

    let panel = match Panel::new(prices) {
        Ok(panel) => panel,
        Err(e) => {
            warn!(error = %e, "invalid price frame");
            return None;
        }
    };
    let close = match panel.column("close") {
        Ok(close) => close,
        Err(e) => {
            warn!(error = %e, "invalid price frame");
            return None;
        }
    };

    let values = panel.per_symbol(close, |s| forward_change(s, horizon));
    Some(ForwardReturns {
        horizon,
        dates: panel.dates().to_vec(),
        symbols: (0..panel.len()).map(|row| panel.symbol(row).to_string()).collect(),
        values: values.to_vec(),
    })
}

/// `seq[i + h] / seq[i] - 1`; NaN past the end, at NaN prices and at a zero
/// base.
fn forward_change(seq: &[f64], horizon: usize) -> Vec<f64> {
    (0..seq.len())
        .map(|i| match seq.get(i + horizon) {
            Some(&future) if seq[i] != 0.0 => future / seq[i] - 1.0,
            _ => f64::NAN,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::df;

    fn prices() -> DataFrame {
        df! {
            "datetime" => ["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-02", "2024-01-03", "2024-01-04"],
            "symbol" => ["A", "A", "A", "B", "B", "B"],
            "close" => [10.0, 11.0, 12.1, 0.0, 5.0, 4.0],
        }
        .unwrap()
    }

    #[test]
    fn test_horizon_one() {
        let fwd = make_forward_return(&prices(), 1).unwrap();
        let v = fwd.values();
        assert_relative_eq!(v[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(v[1], 0.1, epsilon = 1e-12);
        // last row of each symbol
        assert!(v[2].is_nan());
        // zero base
        assert!(v[3].is_nan());
        assert_relative_eq!(v[4], -0.2, epsilon = 1e-12);
        assert!(v[5].is_nan());
    }

    #[test]
    fn test_horizon_two_stays_within_symbol() {
        let fwd = make_forward_return(&prices(), 2).unwrap();
        let v = fwd.values();
        assert_relative_eq!(v[0], 0.21, epsilon = 1e-12);
        assert!(v[1].is_nan() && v[2].is_nan());
        assert!(v[3].is_nan() && v[4].is_nan() && v[5].is_nan());
        assert_eq!(fwd.lookup().len(), 1);
    }

    #[test]
    fn test_invalid_inputs_yield_none() {
        assert!(make_forward_return(&prices(), 0).is_none());
        let no_close = prices().drop("close").unwrap();
        assert!(make_forward_return(&no_close, 1).is_none());
        let empty = prices().head(Some(0));
        assert!(make_forward_return(&empty, 1).is_none());
    }

    #[test]
    fn test_frame_stores_undefined_as_null() {
        let frame = make_forward_return(&prices(), 1).unwrap().to_frame().unwrap();
        assert_eq!(frame.height(), 6);
        assert_eq!(frame.column(FORWARD_RETURN).unwrap().null_count(), 3);
    }
}
