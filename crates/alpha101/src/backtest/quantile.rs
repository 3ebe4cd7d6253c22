//! Quantile portfolios.
//!
//! Each day the symbols are ordered by factor value (ties keep symbol order)
//! and cut into `min(q, n)` buckets of near-equal size. A bucket's return is
//! the equal-weighted mean forward return of its members, and the long-short
//! spread is the top bucket minus the bottom one.

use super::{Joined, Observation, make_forward_return, nullable};
use crate::Result;
use crate::panel::DATETIME;
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, warn};

/// Bucket returns for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileDay {
    /// Trading day
    pub date: NaiveDate,
    /// Mean forward return of buckets `Q1..Qq`; NaN for an empty bucket
    pub returns: Vec<f64>,
    /// Members per bucket
    pub counts: Vec<usize>,
    /// `Qq - Q1`; NaN when either bucket is empty
    pub long_short: f64,
}

/// Per-day quantile portfolio returns.
#[derive(Debug, Clone)]
pub struct QuantileReport {
    quantiles: usize,
    days: Vec<QuantileDay>,
    excluded_days: usize,
}

impl QuantileReport {
    /// Report with no days.
    pub const fn empty(quantiles: usize) -> Self {
        Self {
            quantiles,
            days: Vec::new(),
            excluded_days: 0,
        }
    }

    /// Number of buckets.
    pub const fn quantiles(&self) -> usize {
        self.quantiles
    }

    /// Days that formed at least two buckets, ascending.
    pub fn days(&self) -> &[QuantileDay] {
        &self.days
    }

    /// Days dropped for having fewer than two symbols or buckets.
    pub const fn excluded_days(&self) -> usize {
        self.excluded_days
    }

    /// Daily long-short spread.
    pub fn long_short(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.long_short).collect()
    }

    /// `datetime, Q1..Qq, LS`.
    pub fn ports_frame(&self) -> Result<DataFrame> {
        let columns: Vec<Vec<f64>> = (0..self.quantiles)
            .map(|j| self.days.iter().map(|d| d.returns[j]).collect())
            .collect();
        self.frame(columns, self.long_short())
    }

    /// Compounded growth of one unit per bucket and for the spread.
    ///
    /// Missing returns count as zero while compounding.
    pub fn cumulative(&self) -> Result<DataFrame> {
        let columns: Vec<Vec<f64>> = (0..self.quantiles)
            .map(|j| compound(self.days.iter().map(|d| d.returns[j])))
            .collect();
        self.frame(columns, compound(self.days.iter().map(|d| d.long_short)))
    }

    fn frame(&self, quantiles: Vec<Vec<f64>>, long_short: Vec<f64>) -> Result<DataFrame> {
        let dates: Vec<NaiveDate> = self.days.iter().map(|d| d.date).collect();
        let mut columns = vec![Column::new(DATETIME.into(), dates)];
        for (j, values) in quantiles.into_iter().enumerate() {
            columns.push(nullable_column(&format!("Q{}", j + 1), &values));
        }
        columns.push(nullable_column("LS", &long_short));
        Ok(DataFrame::new(columns)?)
    }
}

fn nullable_column(name: &str, values: &[f64]) -> Column {
    let values: Vec<Option<f64>> = values.iter().map(|v| nullable(*v)).collect();
    Column::new(name.into(), values)
}

fn compound(returns: impl Iterator<Item = f64>) -> Vec<f64> {
    returns
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + if r.is_nan() { 0.0 } else { r };
            Some(*wealth)
        })
        .collect()
}

/// Bucket of the `rank`-th (1-based) of `n` members cut into `k` groups.
///
/// Equal-frequency cut over ranks `1..=n`: rank `r` falls in bucket
/// `ceil((r - 1) * k / (n - 1))`, with rank 1 in the first bucket.
const fn bucket(rank: usize, n: usize, k: usize) -> usize {
    let scaled = (rank - 1) * k;
    let j = scaled.div_ceil(n - 1);
    if j == 0 { 1 } else { j }
}

/// Quantile portfolios of `factor` over `horizon`-row forward returns of
/// `prices`, using `q` buckets.
///
/// Invalid input or `q < 2` yields an empty report.
pub fn quantile_portfolios(factor: &DataFrame, prices: &DataFrame, horizon: usize, q: usize) -> QuantileReport {
    if q < 2 {
        warn!(quantiles = q, "at least two quantiles are required");
        return QuantileReport::empty(q);
    }
    make_forward_return(prices, horizon)
        .and_then(|fwd| Joined::new(factor, &fwd))
        .map_or_else(|| QuantileReport::empty(q), |joined| from_joined(&joined, q))
}

pub(crate) fn from_joined(joined: &Joined, q: usize) -> QuantileReport {
    let mut report = QuantileReport::empty(q);
    for (date, members) in joined.by_date() {
        match assign(date, &members, q) {
            Some(day) => report.days.push(day),
            None => report.excluded_days += 1,
        }
    }
    if report.excluded_days > 0 {
        debug!(
            excluded = report.excluded_days,
            kept = report.days.len(),
            "days without enough symbols for quantile buckets"
        );
    }
    report
}

fn assign(date: NaiveDate, members: &[&Observation], q: usize) -> Option<QuantileDay> {
    let n = members.len();
    if n < 2 {
        return None;
    }
    let k = q.min(n);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| members[a].value.total_cmp(&members[b].value));

    let mut sums = vec![0.0; q];
    let mut counts = vec![0usize; q];
    for (position, &i) in order.iter().enumerate() {
        let j = bucket(position + 1, n, k) - 1;
        sums[j] += members[i].forward;
        counts[j] += 1;
    }
    if counts.iter().filter(|&&c| c > 0).count() < 2 {
        return None;
    }

    let returns: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c == 0 { f64::NAN } else { s / c as f64 })
        .collect();
    let long_short = returns[q - 1] - returns[0];
    Some(QuantileDay {
        date,
        returns,
        counts,
        long_short,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::df;
    use rstest::rstest;

    #[rstest]
    #[case(5, 5, vec![1, 2, 3, 4, 5])]
    #[case(10, 5, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5])]
    #[case(7, 3, vec![1, 1, 1, 2, 2, 3, 3])]
    #[case(2, 2, vec![1, 2])]
    fn test_bucket_sizes(#[case] n: usize, #[case] k: usize, #[case] expected: Vec<usize>) {
        let buckets: Vec<usize> = (1..=n).map(|r| bucket(r, n, k)).collect();
        assert_eq!(buckets, expected);
    }

    fn one_day(values: &[f64], returns: &[f64]) -> (DataFrame, DataFrame) {
        let symbols: Vec<String> = (0..values.len()).map(|i| format!("S{i:02}")).collect();
        let mut dates = Vec::new();
        let mut syms = Vec::new();
        let mut close = Vec::new();
        for (s, r) in symbols.iter().zip(returns) {
            dates.extend(["2024-05-06", "2024-05-07"]);
            syms.extend([s.clone(), s.clone()]);
            close.extend([100.0, 100.0 * (1.0 + r)]);
        }
        let prices = df! { "datetime" => dates, "symbol" => syms, "close" => close }.unwrap();
        let factor = df! {
            "datetime" => vec!["2024-05-06"; values.len()],
            "symbol" => symbols,
            "value" => values.to_vec(),
        }
        .unwrap();
        (factor, prices)
    }

    #[test]
    fn test_buckets_follow_factor_order() {
        let (factor, prices) = one_day(&[5.0, 1.0, 4.0, 2.0, 3.0], &[0.05, 0.01, 0.04, 0.02, 0.03]);
        let report = quantile_portfolios(&factor, &prices, 1, 5);
        let day = &report.days()[0];
        for (j, r) in day.returns.iter().enumerate() {
            assert_relative_eq!(*r, 0.01 * (j + 1) as f64, epsilon = 1e-9);
        }
        assert_relative_eq!(day.long_short, 0.04, epsilon = 1e-9);
        assert_eq!(day.counts, vec![1; 5]);
    }

    #[test]
    fn test_fewer_symbols_than_quantiles() {
        let (factor, prices) = one_day(&[2.0, 1.0, 3.0], &[0.02, 0.01, 0.03]);
        let report = quantile_portfolios(&factor, &prices, 1, 5);
        let day = &report.days()[0];
        assert_eq!(day.counts, vec![1, 1, 1, 0, 0]);
        assert!(day.returns[4].is_nan());
        assert!(day.long_short.is_nan());
    }

    #[test]
    fn test_single_symbol_day_is_excluded() {
        let (factor, prices) = one_day(&[1.0], &[0.01]);
        let report = quantile_portfolios(&factor, &prices, 1, 5);
        assert!(report.days().is_empty());
        assert_eq!(report.excluded_days(), 1);
    }

    #[test]
    fn test_ties_keep_symbol_order() {
        let (factor, prices) = one_day(&[1.0, 1.0, 1.0, 1.0], &[0.01, 0.02, 0.03, 0.04]);
        let report = quantile_portfolios(&factor, &prices, 1, 2);
        let day = &report.days()[0];
        assert_relative_eq!(day.returns[0], 0.015, epsilon = 1e-9);
        assert_relative_eq!(day.returns[1], 0.035, epsilon = 1e-9);
    }

    #[test]
    fn test_cumulative_treats_missing_as_zero() {
        let out = compound([0.1, f64::NAN, -0.5].into_iter());
        assert_relative_eq!(out[0], 1.1, epsilon = 1e-12);
        assert_relative_eq!(out[1], 1.1, epsilon = 1e-12);
        assert_relative_eq!(out[2], 0.55, epsilon = 1e-12);
    }

    #[test]
    fn test_frames() {
        let (factor, prices) = one_day(&[2.0, 1.0, 3.0], &[0.02, 0.01, 0.03]);
        let report = quantile_portfolios(&factor, &prices, 1, 3);
        let ports = report.ports_frame().unwrap();
        assert_eq!(ports.get_column_names_str(), ["datetime", "Q1", "Q2", "Q3", "LS"]);
        let cum = report.cumulative().unwrap();
        let q3 = cum.column("Q3").unwrap().f64().unwrap().get(0).unwrap();
        assert_relative_eq!(q3, 1.03, epsilon = 1e-9);
        assert!(quantile_portfolios(&factor, &prices, 1, 1).days().is_empty());
    }
}
