//! Volume and turnover formulas.

use super::expr::*;

alpha! {
    /// Alpha#25: rank of the negative return scaled by dollar liquidity and
    /// the close's distance below the high.
    Alpha025 {
        description: "rank(-returns * adv20 * vwap * (high - close))",
        category: Liquidity,
        columns: ["returns", "vwap", "high", "close", "volume"],
        lookback: 20,
        compute: |p| {
            let adv20 = p.adv(p.col("volume")?, 20);
            let upper_wick = p.col("high")? - p.col("close")?;
            let score = -p.col("returns")? * &adv20 * p.col("vwap")? * &upper_wick;
            p.rank(&score)
        }
    }
}

alpha! {
    Alpha030 {
        description: "(1 - rank(sign(delta(delay(close, 1), 1)) + sign(delta(delay(close, 2), 1)) + sign(delta(delay(close, 3), 1)))) * sum(volume, 5) / sum(volume, 20)",
        category: Liquidity,
        columns: ["close", "volume"],
        lookback: 20,
        compute: |p| {
            let close = p.col("close")?;
            let volume = p.col("volume")?;
            let streak = (1..=3)
                .map(|lag| sign(&p.delta(&p.delay(close, lag), 1)))
                .fold(ndarray::Array1::<f64>::zeros(close.len()), |acc, s| acc + s);
            let signal = 1.0 - p.rank(&streak);
            div(&(signal * &p.ts_sum(volume, 5)), &p.ts_sum(volume, 20))
        }
    }
}

alpha! {
    Alpha035 {
        description: "ts_rank(volume, 32) * (1 - ts_rank(close + high - low, 16)) * (1 - ts_rank(returns, 32))",
        category: Liquidity,
        columns: ["volume", "close", "high", "low", "returns"],
        lookback: 32,
        compute: |p| {
            let range_close = p.col("close")? + p.col("high")? - p.col("low")?;
            let a = p.ts_rank(p.col("volume")?, 32);
            let b = 1.0 - p.ts_rank(&range_close, 16);
            let c = 1.0 - p.ts_rank(p.col("returns")?, 32);
            a * b * c
        }
    }
}

alpha! {
    /// Alpha#43: abnormal volume timing a 7-day decline.
    Alpha043 {
        description: "ts_rank(volume / adv20, 20) * ts_rank(-delta(close, 7), 8)",
        category: Liquidity,
        columns: ["volume", "close"],
        lookback: 20,
        compute: |p| {
            let volume = p.col("volume")?;
            let relative_volume = volume / &p.adv(volume, 20);
            let decline = -p.delta(p.col("close")?, 7);
            p.ts_rank(&relative_volume, 20) * p.ts_rank(&decline, 8)
        }
    }
}

alpha! {
    Alpha047 {
        description: "((rank(1 / close) * volume) / adv20) * ((high * rank(high - close)) / (sum(high, 5) / 5)) - rank(vwap - delay(vwap, 5))",
        category: Liquidity,
        columns: ["close", "high", "vwap", "volume"],
        lookback: 20,
        compute: |p| {
            let close = p.col("close")?;
            let high = p.col("high")?;
            let vwap = p.col("vwap")?;
            let volume = p.col("volume")?;

            let inverse_price = p.rank(&(1.0 / close)) * volume / &p.adv(volume, 20);
            let high_mean = p.ts_sum(high, 5) / 5.0;
            let wick = high * &p.rank(&(high - close)) / &high_mean;
            inverse_price * wick - p.rank(&(vwap - &p.delay(vwap, 5)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphas::fixtures::feature_panel;
    use crate::Factor;

    #[test]
    fn test_alpha035_bounded_by_ranks() {
        let panel = feature_panel(&["AAA", "BBB", "CCC"], 80);
        let values = Alpha035.compute_raw(&panel).unwrap();
        let defined: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        assert!(!defined.is_empty());
        // Product of one rank in (0, 1] and two complements in [0, 1)
        assert!(defined.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_alpha030_needs_twenty_days_of_volume() {
        let panel = feature_panel(&["AAA", "BBB"], 25);
        let values = Alpha030.compute_raw(&panel).unwrap();
        assert!(values[..19].iter().all(|v| v.is_nan()));
        assert!(values[19..25].iter().all(|v| v.is_finite()));
    }
}
