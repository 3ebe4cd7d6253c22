//! Summary statistics over paired observations.

use crate::ops::average_ranks;

/// Mean of the non-NaN values; NaN when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Sample standard deviation (n - 1) of the non-NaN values.
pub fn sample_std(values: &[f64]) -> f64 {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() < 2 {
        return f64::NAN;
    }
    let m = mean(&valid);
    let ss: f64 = valid.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (valid.len() - 1) as f64).sqrt()
}

/// `mean / (std / sqrt(n))` over the non-NaN values.
///
/// NaN with fewer than two observations or zero dispersion.
pub fn t_stat(values: &[f64]) -> f64 {
    let n = values.iter().filter(|v| !v.is_nan()).count();
    if n < 2 {
        return f64::NAN;
    }
    let sd = sample_std(values);
    if sd == 0.0 || !sd.is_finite() {
        return f64::NAN;
    }
    mean(values) / (sd / (n as f64).sqrt())
}

/// Pearson correlation of paired, NaN-free samples.
///
/// NaN for fewer than two pairs or when either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Spearman correlation: Pearson of average ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&average_ranks(x), &average_ranks(y))
}
