//! End-to-end scenarios over small synthetic panels.

use alpha101::backtest::{ic_rankic, make_forward_return, quantile_portfolios};
use alpha101::{
    BacktestConfig, FactorError, FactorRegistry, FeatureConfig, Panel, build_features, compute_factors,
    run_backtest,
};
use approx::assert_relative_eq;
use chrono::{Days, NaiveDate};
use ndarray::Array1;
use polars::df;
use polars::prelude::*;

const SYMBOLS: [&str; 3] = ["AAA", "BBB", "CCC"];

fn day(d: usize) -> String {
    format!("2024-03-{:02}", d + 1)
}

/// Close paths for three symbols over ten days, rows in date-major order.
fn three_by_ten() -> (Vec<String>, Vec<&'static str>, Vec<f64>) {
    let paths: [[f64; 10]; 3] = [
        [10.0, 10.4, 10.1, 10.9, 11.2, 10.8, 11.5, 11.9, 11.4, 12.0],
        [20.0, 19.5, 19.9, 20.6, 20.1, 21.3, 21.0, 20.2, 20.9, 21.7],
        [15.0, 15.3, 14.6, 14.9, 15.8, 15.5, 16.4, 16.0, 15.2, 15.9],
    ];
    let mut dates = Vec::new();
    let mut symbols = Vec::new();
    let mut close = Vec::new();
    for d in 0..10 {
        for (s, sym) in SYMBOLS.iter().enumerate() {
            dates.push(day(d));
            symbols.push(*sym);
            close.push(paths[s][d]);
        }
    }
    (dates, symbols, close)
}

fn reference_pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let cov: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let vx: f64 = x.iter().map(|a| (a - mx).powi(2)).sum();
    let vy: f64 = y.iter().map(|b| (b - my).powi(2)).sum();
    cov / (vx * vy).sqrt()
}

#[test]
fn price_factor_ic_matches_reference_pearson() {
    let (dates, symbols, close) = three_by_ten();
    let prices = df! {
        "datetime" => dates.clone(),
        "symbol" => symbols.clone(),
        "close" => close.clone(),
    }
    .unwrap();
    let factor = df! {
        "datetime" => dates,
        "symbol" => symbols,
        "value" => close.clone(),
    }
    .unwrap();

    let report = ic_rankic(&factor, &prices, 1);
    assert_eq!(report.daily.len(), 9);

    for (d, daily) in report.daily.iter().enumerate() {
        let today = &close[d * 3..d * 3 + 3];
        let tomorrow = &close[(d + 1) * 3..(d + 1) * 3 + 3];
        let fwd: Vec<f64> = today.iter().zip(tomorrow).map(|(t, n)| n / t - 1.0).collect();
        assert_eq!(daily.n, 3);
        assert_relative_eq!(daily.ic, reference_pearson(today, &fwd), epsilon = 1e-9);
    }
}

#[test]
fn forward_return_at_horizon_one() {
    let (dates, symbols, close) = three_by_ten();
    let prices = df! { "datetime" => dates, "symbol" => symbols, "close" => close.clone() }.unwrap();
    let fwd = make_forward_return(&prices, 1).unwrap();

    for (s, sym) in SYMBOLS.iter().enumerate() {
        let rows: Vec<f64> = fwd.iter().filter(|(_, name, _)| name == sym).map(|(_, _, v)| v).collect();
        assert_eq!(rows.len(), 10);
        for t in 0..9 {
            let expected = close[(t + 1) * 3 + s] / close[t * 3 + s] - 1.0;
            assert_relative_eq!(rows[t], expected, epsilon = 1e-12);
        }
        assert!(rows[9].is_nan());
    }
}

#[test]
fn flat_cross_section_ranks_midpoint_and_has_no_ic() {
    let names = ["A", "B", "C", "D", "E"];
    let mut dates = Vec::new();
    let mut symbols = Vec::new();
    let mut close = Vec::new();
    let mut value = Vec::new();
    for d in 0..2 {
        for (s, sym) in names.iter().enumerate() {
            dates.push(day(d));
            symbols.push(*sym);
            close.push(10.0 + s as f64 + d as f64 * (s as f64 + 1.0) * 0.1);
            value.push(1.0);
        }
    }
    let prices = df! { "datetime" => dates.clone(), "symbol" => symbols.clone(), "close" => close }.unwrap();
    let factor = df! { "datetime" => dates, "symbol" => symbols, "value" => value }.unwrap();

    let panel = Panel::new(&factor).unwrap();
    let ranks = panel.cs_rank(panel.column("value").unwrap());
    assert!(ranks.iter().all(|r| *r == 0.5));

    let report = ic_rankic(&factor, &prices, 1);
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.daily[0].n, 5);
    assert!(report.daily[0].ic.is_nan());
    assert!(report.daily[0].rank_ic.is_nan());
}

#[test]
fn single_symbol_day_is_excluded_without_failing() {
    let prices = df! {
        "datetime" => ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-02", "2024-03-03"],
        "symbol" => ["AAA", "AAA", "AAA", "BBB", "BBB"],
        "close" => [10.0, 11.0, 10.5, 20.0, 21.0],
    }
    .unwrap();
    let factor = df! {
        "datetime" => ["2024-03-01", "2024-03-02", "2024-03-02"],
        "symbol" => ["AAA", "AAA", "BBB"],
        "value" => [1.0, 2.0, 3.0],
    }
    .unwrap();

    let report = run_backtest(&factor, &prices, &BacktestConfig::default());
    let first = &report.ic.daily[0];
    assert_eq!(first.n, 1);
    assert!(first.ic.is_nan() && first.rank_ic.is_nan());
    // two members, both rising with the factor
    assert_relative_eq!(report.ic.daily[1].ic, 1.0, epsilon = 1e-12);

    assert_eq!(report.quantiles.excluded_days(), 1);
    assert_eq!(report.quantiles.days().len(), 1);
    assert_eq!(report.quantiles.days()[0].date.to_string(), "2024-03-02");
}

#[test]
fn quantile_counts_reproduce_cross_sectional_mean() {
    let n = 13;
    let mut dates = Vec::new();
    let mut symbols = Vec::new();
    let mut close = Vec::new();
    let mut value = Vec::new();
    for s in 0..n {
        let sym = format!("S{s:02}");
        for d in 0..4 {
            dates.push(day(d));
            symbols.push(sym.clone());
            close.push(50.0 + ((s * 17 + d * 5) % 11) as f64);
            value.push(((s * 7 + d * 3) % 13) as f64 * 0.5 - 2.0);
        }
    }
    let prices = df! { "datetime" => dates.clone(), "symbol" => symbols.clone(), "close" => close }.unwrap();
    let factor = df! { "datetime" => dates, "symbol" => symbols, "value" => value }.unwrap();

    let fwd = make_forward_return(&prices, 1).unwrap();
    let report = quantile_portfolios(&factor, &prices, 1, 5);
    assert_eq!(report.days().len(), 3);

    for qday in report.days() {
        let day_returns: Vec<f64> = fwd
            .iter()
            .filter(|(d, _, v)| *d == qday.date && !v.is_nan())
            .map(|(_, _, v)| v)
            .collect();
        let mean = day_returns.iter().sum::<f64>() / day_returns.len() as f64;

        let total: usize = qday.counts.iter().sum();
        assert_eq!(total, n);
        let weighted: f64 = qday
            .returns
            .iter()
            .zip(&qday.counts)
            .filter(|(_, c)| **c > 0)
            .map(|(r, c)| r * *c as f64)
            .sum();
        assert_relative_eq!(weighted / total as f64, mean, epsilon = 1e-12);
    }
}

fn ohlcv(days: usize) -> DataFrame {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut dates = Vec::new();
    let mut symbols = Vec::new();
    let (mut open, mut high, mut low, mut close) = (vec![], vec![], vec![], vec![]);
    let (mut volume, mut amount) = (vec![], vec![]);
    for (s, sym) in SYMBOLS.iter().enumerate() {
        for d in 0..days {
            let t = d as f64;
            let c = 30.0 + 5.0 * s as f64 + (0.3 * t + s as f64).sin() * 2.0 + ((d * 13 + s * 7) % 9) as f64 * 0.1;
            let o = c - 0.2 + ((d + s) % 3) as f64 * 0.15;
            let v = 1_000.0 + ((d * 31 + s * 11) % 17) as f64 * 50.0;
            dates.push((start + Days::new(d as u64)).to_string());
            symbols.push(*sym);
            open.push(o);
            high.push(c.max(o) + 0.3);
            low.push(c.min(o) - 0.3);
            close.push(c);
            volume.push(v);
            amount.push(v * (c + o) / 2.0);
        }
    }
    df! {
        "datetime" => dates,
        "symbol" => symbols,
        "open" => open,
        "high" => high,
        "low" => low,
        "close" => close,
        "volume" => volume,
        "amount" => amount,
    }
    .unwrap()
}

#[test]
fn registry_to_backtest_lifecycle() {
    let registry = FactorRegistry::global().unwrap();
    assert!(matches!(registry.get("Alpha002"), Err(FactorError::NotFound(_))));

    let features = build_features(&ohlcv(84), &FeatureConfig::default()).unwrap();
    let panel = Panel::new(&features).unwrap();
    let run = compute_factors(registry, &panel, &["Alpha012", "Alpha101", "Alpha002"]);
    assert_eq!(run.failed(), vec!["Alpha002"]);

    let factor = run.frame("Alpha101").unwrap();
    assert_eq!(factor.get_column_names_str(), ["datetime", "symbol", "value"]);
    assert_eq!(factor.height(), panel.len());

    let report = run_backtest(factor, &features, &BacktestConfig { quantiles: 3, ..Default::default() });
    assert_eq!(report.ic.summary.days, 83);
    assert_relative_eq!(report.ic.summary.avg_n, 3.0);
    assert!(report.ic.summary.ic_mean.is_finite());
    assert_eq!(report.ic.ts_summary.symbols, 3);
    assert_eq!(report.quantiles.days().len(), 83);
    assert_eq!(report.quantiles.cumulative().unwrap().width(), 5);
}

#[test]
fn per_symbol_grouping_never_crosses_symbols() {
    let features = build_features(&ohlcv(40), &FeatureConfig::default()).unwrap();
    let panel = Panel::new(&features).unwrap();
    let returns = panel.column("returns").unwrap();
    let firsts: Vec<usize> = panel.symbol_ranges().map(|(_, rows)| rows.start).collect();
    assert_eq!(firsts, vec![0, 40, 80]);
    for row in firsts {
        assert!(returns[row].is_nan());
    }

    let lagged = panel.per_symbol(&Array1::from(vec![1.0; panel.len()]), |s| alpha101::ops::delay(s, 1));
    assert_eq!(lagged.iter().filter(|v| v.is_nan()).count(), 3);
}
