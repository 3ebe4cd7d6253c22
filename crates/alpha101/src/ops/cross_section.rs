//! Operators over one timestamp's cross-section.
//!
//! Inputs are the values of every symbol sharing a timestamp. NaN members are
//! excluded from the statistics and stay NaN in the output.

/// 1-based ranks with ties sharing their average rank. NaN stays NaN.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![f64::NAN; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start + 1 ..= end
        let shared = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = shared;
        }
        start = end;
    }
    ranks
}

/// Cross-sectional percentile rank in `(0, 1]`.
///
/// Ranks are averaged over ties and divided by the number of valid members,
/// so distinct values map onto `{1/k, 2/k, ..., 1}`. A cross-section whose
/// valid members all share one value (including a single member) has no
/// ordering and every member ranks 0.5.
pub fn cs_rank(values: &[f64]) -> Vec<f64> {
    let mut valid = values.iter().copied().filter(|v| !v.is_nan());
    let Some(first) = valid.next() else {
        return vec![f64::NAN; values.len()];
    };
    let count = 1 + valid.clone().count();

    if valid.all(|v| v == first) {
        return values
            .iter()
            .map(|v| if v.is_nan() { f64::NAN } else { 0.5 })
            .collect();
    }

    average_ranks(values)
        .into_iter()
        .map(|r| r / count as f64)
        .collect()
}

/// Cross-sectional z-score using the sample standard deviation.
///
/// Undefined (all NaN) when fewer than two valid members exist or when every
/// valid member has the same value.
pub fn cs_zscore(values: &[f64]) -> Vec<f64> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() < 2 {
        return vec![f64::NAN; values.len()];
    }

    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let var = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return vec![f64::NAN; values.len()];
    }

    values.iter().map(|v| (v - mean) / std).collect()
}
