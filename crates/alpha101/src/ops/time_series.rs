//! Shift, rank and weighting operators along one symbol's time axis.

/// Value from `n` observations earlier. The first `n` positions are NaN.
pub fn delay(seq: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; seq.len()];
    if n < seq.len() {
        out[n..].copy_from_slice(&seq[..seq.len() - n]);
    }
    out
}

/// Current value minus the value `n` observations earlier.
pub fn delta(seq: &[f64], n: usize) -> Vec<f64> {
    seq.iter()
        .zip(delay(seq, n))
        .map(|(current, previous)| current - previous)
        .collect()
}

/// Percentile rank of each value within its own trailing window.
///
/// Defined once `window` non-NaN observations end at `i`; the result is the
/// fraction of the window that is `<=` the value at `i`, so it lies in
/// `(0, 1]` and equals 1.0 when the latest value is the window maximum.
pub fn ts_rank(seq: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; seq.len()];
    if window == 0 || window > seq.len() {
        return out;
    }

    for (start, values) in seq.windows(window).enumerate() {
        if values.iter().any(|v| v.is_nan()) {
            continue;
        }
        let last = values[window - 1];
        let at_or_below = values.iter().filter(|v| **v <= last).count();
        out[start + window - 1] = at_or_below as f64 / window as f64;
    }
    out
}

/// 1-based position of the minimum inside each trailing window (first
/// occurrence on ties). Position 1 is the oldest in-window observation.
pub fn ts_argmin(seq: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; seq.len()];
    if window == 0 || window > seq.len() {
        return out;
    }

    for (start, values) in seq.windows(window).enumerate() {
        if values.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mut best = 0;
        for (i, v) in values.iter().enumerate().skip(1) {
            if *v < values[best] {
                best = i;
            }
        }
        out[start + window - 1] = (best + 1) as f64;
    }
    out
}

/// Linear decay weights `1..=window`, normalised to sum to one.
pub fn decay_weights(window: usize) -> Vec<f64> {
    let total = (window * (window + 1)) as f64 / 2.0;
    (1..=window).map(|k| k as f64 / total).collect()
}

/// Linearly decayed weighted moving average.
///
/// The oldest in-window value carries weight 1 and the newest weight
/// `window`. A NaN anywhere in the window makes the output NaN.
pub fn decay_linear(seq: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; seq.len()];
    if window == 0 || window > seq.len() {
        return out;
    }

    let weights = decay_weights(window);
    for (start, values) in seq.windows(window).enumerate() {
        if values.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[start + window - 1] = values.iter().zip(&weights).map(|(v, w)| v * w).sum();
    }
    out
}
