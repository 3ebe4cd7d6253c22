//! Information coefficients.
//!
//! The daily cross-sectional IC is the Pearson correlation between factor
//! values and forward returns across one day's symbols; RankIC is the
//! Spearman correlation. The time-series variant correlates one symbol's
//! values with its own forward returns over time.

use super::stats::{mean, pearson, spearman, t_stat};
use super::{Joined, make_forward_return, nullable};
use crate::Result;
use crate::panel::{DATETIME, SYMBOL};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

/// Minimum paired observations for a symbol's time-series IC by default.
pub const DEFAULT_MIN_TS_OBSERVATIONS: usize = 10;

/// One day's cross-sectional correlations.
#[derive(Debug, Clone, Serialize)]
pub struct DailyIc {
    /// Trading day
    pub date: NaiveDate,
    /// Pearson correlation, NaN with fewer than two symbols
    pub ic: f64,
    /// Spearman correlation, NaN with fewer than two symbols
    pub rank_ic: f64,
    /// Symbols with both a value and a forward return
    pub n: usize,
}

/// Aggregate of the daily correlations.
#[derive(Debug, Clone, Serialize)]
pub struct IcSummary {
    /// Mean daily IC
    pub ic_mean: f64,
    /// t-statistic of the daily IC
    pub ic_t: f64,
    /// Mean daily RankIC
    pub rank_ic_mean: f64,
    /// t-statistic of the daily RankIC
    pub rank_ic_t: f64,
    /// Days with at least one paired observation
    pub days: usize,
    /// Average symbols per day
    pub avg_n: f64,
}

impl IcSummary {
    fn from_daily(daily: &[DailyIc]) -> Self {
        let ic: Vec<f64> = daily.iter().map(|d| d.ic).collect();
        let rank_ic: Vec<f64> = daily.iter().map(|d| d.rank_ic).collect();
        let n: Vec<f64> = daily.iter().map(|d| d.n as f64).collect();
        Self {
            ic_mean: mean(&ic),
            ic_t: t_stat(&ic),
            rank_ic_mean: mean(&rank_ic),
            rank_ic_t: t_stat(&rank_ic),
            days: daily.len(),
            avg_n: mean(&n),
        }
    }
}

/// One symbol's time-series correlations.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolIc {
    /// Symbol
    pub symbol: String,
    /// Pearson correlation over time
    pub ts_ic: f64,
    /// Spearman correlation over time
    pub ts_rank_ic: f64,
    /// Paired observations
    pub t: usize,
}

/// Aggregate of the per-symbol time-series correlations.
#[derive(Debug, Clone, Serialize)]
pub struct TsSummary {
    /// Mean time-series IC across symbols
    pub ts_ic_mean: f64,
    /// t-statistic of the time-series IC
    pub ts_ic_t: f64,
    /// Mean time-series RankIC across symbols
    pub ts_rank_ic_mean: f64,
    /// t-statistic of the time-series RankIC
    pub ts_rank_ic_t: f64,
    /// Symbols with enough observations
    pub symbols: usize,
    /// Average observations per included symbol
    pub avg_t: f64,
}

impl TsSummary {
    fn from_symbols(per_symbol: &[SymbolIc]) -> Self {
        let ic: Vec<f64> = per_symbol.iter().map(|s| s.ts_ic).collect();
        let rank_ic: Vec<f64> = per_symbol.iter().map(|s| s.ts_rank_ic).collect();
        let t: Vec<f64> = per_symbol.iter().map(|s| s.t as f64).collect();
        Self {
            ts_ic_mean: mean(&ic),
            ts_ic_t: t_stat(&ic),
            ts_rank_ic_mean: mean(&rank_ic),
            ts_rank_ic_t: t_stat(&rank_ic),
            symbols: per_symbol.len(),
            avg_t: mean(&t),
        }
    }
}

/// IC results: daily table, summary, and per-symbol time-series view.
#[derive(Debug, Clone)]
pub struct IcReport {
    /// Daily correlations, ascending by date
    pub daily: Vec<DailyIc>,
    /// Aggregate of `daily`
    pub summary: IcSummary,
    /// Symbols that met the observation threshold
    pub per_symbol: Vec<SymbolIc>,
    /// Aggregate of `per_symbol`
    pub ts_summary: TsSummary,
}

impl IcReport {
    /// Report with no observations and NaN aggregates.
    pub fn empty() -> Self {
        Self {
            daily: Vec::new(),
            summary: IcSummary::from_daily(&[]),
            per_symbol: Vec::new(),
            ts_summary: TsSummary::from_symbols(&[]),
        }
    }

    /// `datetime, IC, RankIC, N`.
    pub fn daily_frame(&self) -> Result<DataFrame> {
        let dates: Vec<NaiveDate> = self.daily.iter().map(|d| d.date).collect();
        let ic: Vec<Option<f64>> = self.daily.iter().map(|d| nullable(d.ic)).collect();
        let rank_ic: Vec<Option<f64>> = self.daily.iter().map(|d| nullable(d.rank_ic)).collect();
        let n: Vec<u64> = self.daily.iter().map(|d| d.n as u64).collect();
        Ok(DataFrame::new(vec![
            Column::new(DATETIME.into(), dates),
            Column::new("IC".into(), ic),
            Column::new("RankIC".into(), rank_ic),
            Column::new("N".into(), n),
        ])?)
    }

    /// One row: `IC.mean, IC.t, RankIC.mean, RankIC.t, Days, Avg.N`.
    pub fn summary_frame(&self) -> Result<DataFrame> {
        let s = &self.summary;
        Ok(DataFrame::new(vec![
            Column::new("IC.mean".into(), [nullable(s.ic_mean)]),
            Column::new("IC.t".into(), [nullable(s.ic_t)]),
            Column::new("RankIC.mean".into(), [nullable(s.rank_ic_mean)]),
            Column::new("RankIC.t".into(), [nullable(s.rank_ic_t)]),
            Column::new("Days".into(), [s.days as u64]),
            Column::new("Avg.N".into(), [nullable(s.avg_n)]),
        ])?)
    }

    /// One row: `TS.IC.mean, TS.IC.t, TS.RankIC.mean, TS.RankIC.t, Symbols, Avg.T`.
    pub fn ts_summary_frame(&self) -> Result<DataFrame> {
        let s = &self.ts_summary;
        Ok(DataFrame::new(vec![
            Column::new("TS.IC.mean".into(), [nullable(s.ts_ic_mean)]),
            Column::new("TS.IC.t".into(), [nullable(s.ts_ic_t)]),
            Column::new("TS.RankIC.mean".into(), [nullable(s.ts_rank_ic_mean)]),
            Column::new("TS.RankIC.t".into(), [nullable(s.ts_rank_ic_t)]),
            Column::new("Symbols".into(), [s.symbols as u64]),
            Column::new("Avg.T".into(), [nullable(s.avg_t)]),
        ])?)
    }

    /// `symbol, TS.IC, TS.RankIC, T`, one row per included symbol.
    pub fn per_symbol_frame(&self) -> Result<DataFrame> {
        let symbols: Vec<&str> = self.per_symbol.iter().map(|s| s.symbol.as_str()).collect();
        let ic: Vec<Option<f64>> = self.per_symbol.iter().map(|s| nullable(s.ts_ic)).collect();
        let rank_ic: Vec<Option<f64>> = self.per_symbol.iter().map(|s| nullable(s.ts_rank_ic)).collect();
        let t: Vec<u64> = self.per_symbol.iter().map(|s| s.t as u64).collect();
        Ok(DataFrame::new(vec![
            Column::new(SYMBOL.into(), symbols),
            Column::new("TS.IC".into(), ic),
            Column::new("TS.RankIC".into(), rank_ic),
            Column::new("T".into(), t),
        ])?)
    }
}

/// Cross-sectional and time-series IC of `factor` against `horizon`-row
/// forward returns of `prices`.
///
/// Symbols need [`DEFAULT_MIN_TS_OBSERVATIONS`] paired rows to enter the
/// time-series view. Invalid input yields [`IcReport::empty`].
pub fn ic_rankic(factor: &DataFrame, prices: &DataFrame, horizon: usize) -> IcReport {
    make_forward_return(prices, horizon)
        .and_then(|fwd| Joined::new(factor, &fwd))
        .map_or_else(IcReport::empty, |joined| {
            from_joined(&joined, DEFAULT_MIN_TS_OBSERVATIONS)
        })
}

pub(crate) fn from_joined(joined: &Joined, min_ts_observations: usize) -> IcReport {
    let daily: Vec<DailyIc> = joined
        .by_date()
        .into_iter()
        .map(|(date, members)| {
            let (x, y): (Vec<f64>, Vec<f64>) = members.iter().map(|o| (o.value, o.forward)).unzip();
            DailyIc {
                date,
                ic: pearson(&x, &y),
                rank_ic: spearman(&x, &y),
                n: members.len(),
            }
        })
        .collect();

    let per_symbol: Vec<SymbolIc> = joined
        .by_symbol()
        .into_iter()
        .filter(|(_, rows)| rows.len() >= min_ts_observations)
        .map(|(symbol, rows)| {
            let (x, y): (Vec<f64>, Vec<f64>) = rows.iter().map(|o| (o.value, o.forward)).unzip();
            SymbolIc {
                symbol: symbol.to_string(),
                ts_ic: pearson(&x, &y),
                ts_rank_ic: spearman(&x, &y),
                t: rows.len(),
            }
        })
        .collect();

    IcReport {
        summary: IcSummary::from_daily(&daily),
        ts_summary: TsSummary::from_symbols(&per_symbol),
        daily,
        per_symbol,
    }
}
