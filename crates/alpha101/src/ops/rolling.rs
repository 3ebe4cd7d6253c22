//! Trailing-window aggregates over a single time-ordered sequence.
//!
//! Every operator returns a sequence of the input's length. Position `i` holds
//! the aggregate of `[i - window + 1, i]` and is NaN whenever that window is
//! incomplete or contains a NaN. There are no partial windows.

/// Applies `aggregate` to every complete, NaN-free trailing window.
fn rolling_apply<F>(seq: &[f64], window: usize, aggregate: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; seq.len()];
    if window == 0 || window > seq.len() {
        return out;
    }

    for (start, values) in seq.windows(window).enumerate() {
        if values.iter().all(|v| !v.is_nan()) {
            out[start + window - 1] = aggregate(values);
        }
    }
    out
}

/// Applies `aggregate` to every complete trailing window of two aligned
/// sequences. The output follows `a`; positions of `b` beyond its length are
/// treated as missing.
fn rolling_apply_pair<F>(a: &[f64], b: &[f64], window: usize, aggregate: F) -> Vec<f64>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    let mut out = vec![f64::NAN; a.len()];
    let len = a.len().min(b.len());
    if window == 0 || window > len {
        return out;
    }

    for end in window - 1..len {
        let start = end + 1 - window;
        let xs = &a[start..=end];
        let ys = &b[start..=end];
        if xs.iter().chain(ys).all(|v| !v.is_nan()) {
            out[end] = aggregate(xs, ys);
        }
    }
    out
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rolling sum over `window` observations.
pub fn rolling_sum(seq: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(seq, window, |w| w.iter().sum())
}

/// Rolling arithmetic mean over `window` observations.
pub fn rolling_mean(seq: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(seq, window, mean)
}

/// Rolling minimum over `window` observations.
pub fn rolling_min(seq: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(seq, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Rolling maximum over `window` observations.
pub fn rolling_max(seq: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(seq, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Rolling population standard deviation (divides by `window`).
pub fn rolling_std(seq: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(seq, window, |w| {
        let m = mean(w);
        let ss = w.iter().map(|v| (v - m).powi(2)).sum::<f64>();
        (ss / w.len() as f64).sqrt()
    })
}

/// Rolling sample covariance (divides by `window - 1`).
///
/// A window of one observation has no defined sample covariance, so
/// `window == 1` yields NaN everywhere.
pub fn rolling_cov(a: &[f64], b: &[f64], window: usize) -> Vec<f64> {
    rolling_apply_pair(a, b, window, |xs, ys| {
        if xs.len() < 2 {
            return f64::NAN;
        }
        let (mx, my) = (mean(xs), mean(ys));
        let sxy = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (x - mx) * (y - my))
            .sum::<f64>();
        sxy / (xs.len() - 1) as f64
    })
}

/// Rolling Pearson correlation.
///
/// NaN where either window has zero variance. Results are clamped to
/// `[-1, 1]` to absorb rounding in near-collinear windows.
pub fn rolling_corr(a: &[f64], b: &[f64], window: usize) -> Vec<f64> {
    rolling_apply_pair(a, b, window, |xs, ys| {
        let (mx, my) = (mean(xs), mean(ys));
        let mut sxx = 0.0;
        let mut syy = 0.0;
        let mut sxy = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let (dx, dy) = (x - mx, y - my);
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        if sxx <= 0.0 || syy <= 0.0 {
            return f64::NAN;
        }
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    })
}
