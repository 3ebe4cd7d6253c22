//! Price and volume derived series: returns, VWAP and average volume.

use super::rolling::rolling_mean;

/// Simple percent change between consecutive valid closes.
///
/// A NaN close is skipped when looking for the previous observation, so the
/// return after a gap is measured against the last valid close. A zero base
/// price has no defined return and yields NaN.
pub fn returns(close: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    let mut previous: Option<f64> = None;

    for (i, price) in close.iter().copied().enumerate() {
        if price.is_nan() {
            continue;
        }
        if let Some(base) = previous.filter(|b| *b != 0.0) {
            out[i] = price / base - 1.0;
        }
        previous = Some(price);
    }
    out
}

/// Volume-weighted average price from turnover: `amount / volume`.
///
/// `close`, `high` and `low` fix the output alignment only. Zero or missing
/// volume yields NaN rather than an infinite price.
pub fn vwap_from_amount(
    close: &[f64],
    high: &[f64],
    low: &[f64],
    volume: &[f64],
    amount: &[f64],
) -> Vec<f64> {
    let len = close.len();
    let aligned = high.len().min(low.len()).min(volume.len()).min(amount.len());

    (0..len)
        .map(|i| {
            if i >= aligned {
                return f64::NAN;
            }
            let v = volume[i];
            if v == 0.0 || v.is_nan() {
                f64::NAN
            } else {
                amount[i] / v
            }
        })
        .collect()
}

/// Average daily volume: trailing simple moving average over `window`.
pub fn adv(volume: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(volume, window)
}
