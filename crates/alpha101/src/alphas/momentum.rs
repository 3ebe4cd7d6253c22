//! Trend-following and trend-regime formulas.

use super::expr::*;
use crate::Result;
use ndarray::Array1;

/// Regime slope shared by Alpha#46, #49 and #51:
/// `(delay(close, 20) - delay(close, 10)) / 10 - (delay(close, 10) - close) / 10`.
fn trend_slope(p: &PanelOps<'_>, close: &Array1<f64>) -> Array1<f64> {
    let d20 = p.delay(close, 20);
    let d10 = p.delay(close, 10);
    (&d20 - &d10) / 10.0 - (&d10 - close) / 10.0
}

/// One-day reversal: `-(close - delay(close, 1))`.
fn one_day_reversal(p: &PanelOps<'_>, close: &Array1<f64>) -> Array1<f64> {
    -(close - &p.delay(close, 1))
}

/// Follow the daily change when it has kept one sign for `window` days,
/// otherwise fade it. Shared by Alpha#9 and #10.
fn persistent_change(p: &PanelOps<'_>, close: &Array1<f64>, window: usize) -> Array1<f64> {
    let change = p.delta(close, 1);
    let rising = gt(&p.ts_min(&change, window), 0.0);
    let falling = lt(&p.ts_max(&change, window), 0.0);
    let faded = -&change;
    select(&rising, &change, &select(&falling, &change, &faded))
}

fn slope_regime(p: &PanelOps<'_>, threshold: f64) -> Result<Array1<f64>> {
    let close = p.col("close")?;
    let slope = trend_slope(p, close);
    Ok(select(&lt(&slope, threshold), 1.0, &one_day_reversal(p, close)))
}

alpha! {
    /// Alpha#9: follow a 5-day persistent daily change, fade it otherwise.
    Alpha009 {
        description: "where(0 < ts_min(delta(close, 1), 5), delta(close, 1), where(ts_max(delta(close, 1), 5) < 0, delta(close, 1), -delta(close, 1)))",
        category: Momentum,
        columns: ["close"],
        lookback: 5,
        compute: |p| {
            persistent_change(&p, p.col("close")?, 5)
        }
    }
}

alpha! {
    /// Alpha#10: cross-sectional rank of the 4-day variant of Alpha#9.
    Alpha010 {
        description: "rank(where(0 < ts_min(delta(close, 1), 4), delta(close, 1), where(ts_max(delta(close, 1), 4) < 0, delta(close, 1), -delta(close, 1))))",
        category: Momentum,
        columns: ["close"],
        lookback: 4,
        compute: |p| {
            p.rank(&persistent_change(&p, p.col("close")?, 4))
        }
    }
}

alpha! {
    Alpha019 {
        description: "-sign((close - delay(close, 7)) + delta(close, 7)) * (1 + rank(1 + sum(returns, 250)))",
        category: Momentum,
        columns: ["close", "returns"],
        lookback: 250,
        compute: |p| {
            let close = p.col("close")?;
            let change = (close - &p.delay(close, 7)) + p.delta(close, 7);
            let yearly = p.rank(&(1.0 + p.ts_sum(p.col("returns")?, 250)));
            -sign(&change) * (1.0 + yearly)
        }
    }
}

alpha! {
    /// Alpha#24: distance from the 100-day low while the 100-day mean is
    /// flat, a 3-day reversal otherwise.
    Alpha024 {
        description: "where(delta(sum(close, 100) / 100, 100) / delay(close, 100) <= 0.05, -(close - ts_min(close, 100)), -delta(close, 3))",
        category: Momentum,
        columns: ["close"],
        lookback: 100,
        compute: |p| {
            let close = p.col("close")?;
            let mean = p.ts_sum(close, 100) / 100.0;
            let drift = p.delta(&mean, 100) / p.delay(close, 100);
            let off_low = -(close - &p.ts_min(close, 100));
            let reversal = -p.delta(close, 3);
            select(&le(&drift, 0.05), &off_low, &reversal)
        }
    }
}

alpha! {
    Alpha039 {
        description: "-rank(delta(close, 7) * (1 - rank(decay_linear(volume / adv20, 9)))) * (1 + rank(sum(returns, 250)))",
        category: Momentum,
        columns: ["close", "volume", "returns"],
        lookback: 250,
        compute: |p| {
            let close = p.col("close")?;
            let volume = p.col("volume")?;
            let relative_volume = volume / &p.adv(volume, 20);
            let damp = 1.0 - p.rank(&p.decay_linear(&relative_volume, 9));
            let part = -p.rank(&(p.delta(close, 7) * damp));
            part * (1.0 + p.rank(&p.ts_sum(p.col("returns")?, 250)))
        }
    }
}

alpha! {
    Alpha046 {
        description: "where(0.25 < slope, -1, where(slope < 0, 1, -(close - delay(close, 1))))",
        category: Momentum,
        columns: ["close"],
        lookback: 20,
        compute: |p| {
            let close = p.col("close")?;
            let slope = trend_slope(&p, close);
            let inner = select(&lt(&slope, 0.0), 1.0, &one_day_reversal(&p, close));
            select(&gt(&slope, 0.25), -1.0, &inner)
        }
    }
}

alpha! {
    Alpha049 {
        description: "where(slope < -0.1, 1, -(close - delay(close, 1)))",
        category: Momentum,
        columns: ["close"],
        lookback: 20,
        compute: |p| {
            slope_regime(&p, -0.1)?
        }
    }
}

alpha! {
    Alpha051 {
        description: "where(slope < -0.05, 1, -(close - delay(close, 1)))",
        category: Momentum,
        columns: ["close"],
        lookback: 20,
        compute: |p| {
            slope_regime(&p, -0.05)?
        }
    }
}

alpha! {
    /// Alpha#52: breakout of the 5-day low, scaled by long-minus-short
    /// cumulated returns and volume timing.
    Alpha052 {
        description: "((-ts_min(low, 5) + delay(ts_min(low, 5), 5)) * rank((sum(returns, 240) - sum(returns, 20)) / 220)) * ts_rank(volume, 5)",
        category: Momentum,
        columns: ["low", "returns", "volume"],
        lookback: 240,
        compute: |p| {
            let low_min = p.ts_min(p.col("low")?, 5);
            let breakout = p.delay(&low_min, 5) - low_min;
            let returns = p.col("returns")?;
            let drift = (p.ts_sum(returns, 240) - p.ts_sum(returns, 20)) / 220.0;
            breakout * p.rank(&drift) * p.ts_rank(p.col("volume")?, 5)
        }
    }
}

alpha! {
    Alpha084 {
        description: "sign(delta(close, 4)) * ts_rank(vwap - ts_max(vwap, 15), 20)",
        category: Momentum,
        columns: ["vwap", "close"],
        lookback: 20,
        compute: |p| {
            let vwap = p.col("vwap")?;
            let below_high = vwap - &p.ts_max(vwap, 15);
            sign(&p.delta(p.col("close")?, 4)) * p.ts_rank(&below_high, 20)
        }
    }
}
