//! Dispersion-driven formulas.

use super::expr::*;

alpha! {
    Alpha018 {
        description: "-rank((stddev(abs(close - open), 5) + (close - open)) + correlation(close, open, 10))",
        category: Volatility,
        columns: ["close", "open"],
        lookback: 10,
        compute: |p| {
            let close = p.col("close")?;
            let open = p.col("open")?;
            let body = close - open;
            let dispersion = p.ts_std(&abs(&body), 5);
            let corr = p.ts_corr(close, open, 10);
            -p.rank(&(dispersion + body + corr))
        }
    }
}

alpha! {
    /// Alpha#21: Bollinger-style regime on the 8-day band, falling back to
    /// relative volume inside the band.
    Alpha021 {
        description: "where(mean8 + std8 < mean2, -1, where(mean2 < mean8 - std8, 1, where(1 <= volume / adv20, 1, -1)))",
        category: Volatility,
        columns: ["close", "volume"],
        lookback: 20,
        compute: |p| {
            let close = p.col("close")?;
            let volume = p.col("volume")?;
            let mean8 = p.ts_sum(close, 8) / 8.0;
            let std8 = p.ts_std(close, 8);
            let mean2 = p.ts_sum(close, 2) / 2.0;
            let relative_volume = volume / &p.adv(volume, 20);

            let band = lt(&(&mean8 + &std8), &mean2) * -1.0 + lt(&mean2, &(&mean8 - &std8));
            let liquidity = ge(&relative_volume, 1.0) - lt(&relative_volume, 1.0);
            select(&ne(&band, 0.0), &band, &liquidity)
        }
    }
}

alpha! {
    Alpha022 {
        description: "-delta(correlation(high, volume, 5), 5) * rank(stddev(close, 20))",
        category: Volatility,
        columns: ["high", "volume", "close"],
        lookback: 20,
        compute: |p| {
            let corr = p.ts_corr(p.col("high")?, p.col("volume")?, 5);
            -p.delta(&corr, 5) * p.rank(&p.ts_std(p.col("close")?, 20))
        }
    }
}

alpha! {
    /// Alpha#34: short-over-long return volatility and the daily change,
    /// both ranked and inverted.
    Alpha034 {
        description: "(1 - rank(stddev(returns, 2) / stddev(returns, 5))) + (1 - rank(delta(close, 1)))",
        category: Volatility,
        columns: ["returns", "close"],
        lookback: 5,
        compute: |p| {
            let returns = p.col("returns")?;
            let ratio = p.ts_std(returns, 2) / p.ts_std(returns, 5);
            let a = 1.0 - p.rank(&ratio);
            let b = 1.0 - p.rank(&p.delta(p.col("close")?, 1));
            a + b
        }
    }
}

alpha! {
    Alpha040 {
        description: "-rank(stddev(high, 10)) * correlation(high, volume, 10)",
        category: Volatility,
        columns: ["high", "volume"],
        lookback: 10,
        compute: |p| {
            let high = p.col("high")?;
            -p.rank(&p.ts_std(high, 10)) * p.ts_corr(high, p.col("volume")?, 10)
        }
    }
}
