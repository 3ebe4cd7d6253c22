//! Short-horizon reversal and intraday price-location formulas.

use super::expr::*;

alpha! {
    /// Alpha#1: time-series rank of a squared conditional volatility/price
    /// quantity, ranked cross-sectionally and centred.
    Alpha001 {
        description: "rank(ts_rank(where(returns < 0, stddev(returns, 20), close)^2, 5)) - 0.5",
        category: Reversal,
        columns: ["returns", "close"],
        lookback: 20,
        compute: |p| {
            let returns = p.col("returns")?;
            let close = p.col("close")?;
            let part = select(&lt(returns, 0.0), &p.ts_std(returns, 20), close);
            p.rank(&p.ts_rank(&powf(&part, 2.0), 5)) - 0.5
        }
    }
}

alpha! {
    /// Alpha#4: negative 9-day time-series rank of the low's cross-sectional
    /// rank.
    Alpha004 {
        description: "-ts_rank(rank(low), 9)",
        category: Reversal,
        columns: ["low"],
        lookback: 9,
        compute: |p| {
            -p.ts_rank(&p.rank(p.col("low")?), 9)
        }
    }
}

alpha! {
    /// Alpha#5: open relative to its 10-day average, scaled by the close's
    /// distance from VWAP.
    Alpha005 {
        description: "rank(open - sum(open, 10) / 10) * -abs(rank(close - vwap))",
        category: Reversal,
        columns: ["open", "vwap", "close"],
        lookback: 10,
        compute: |p| {
            let open = p.col("open")?;
            let vwap = p.col("vwap")?;
            let close = p.col("close")?;
            let mean = p.ts_sum(open, 10) / 10.0;
            p.rank(&(open - &mean)) * -abs(&p.rank(&(close - vwap)))
        }
    }
}

alpha! {
    Alpha011 {
        description: "(rank(ts_rank(vwap - close, 3)) + rank(ts_rank(close - vwap, 3))) * rank(ts_rank(delta(volume, 3), 3))",
        category: Reversal,
        columns: ["vwap", "close", "volume"],
        lookback: 3,
        compute: |p| {
            let vwap = p.col("vwap")?;
            let close = p.col("close")?;
            let volume = p.col("volume")?;
            let a = p.ts_rank(&(vwap - close), 3);
            let b = p.ts_rank(&(close - vwap), 3);
            let c = p.ts_rank(&p.delta(volume, 3), 3);
            (p.rank(&a) + p.rank(&b)) * p.rank(&c)
        }
    }
}

alpha! {
    /// Alpha#12: sign of the volume change against the price change.
    Alpha012 {
        description: "sign(delta(volume, 1)) * -delta(close, 1)",
        category: Reversal,
        columns: ["close", "volume"],
        lookback: 1,
        compute: |p| {
            let volume = p.col("volume")?;
            let close = p.col("close")?;
            sign(&p.delta(volume, 1)) * -p.delta(close, 1)
        }
    }
}

alpha! {
    /// Alpha#20: overnight gap relative to the previous bar's range.
    Alpha020 {
        description: "-rank(open - delay(high, 1)) * rank(open - delay(close, 1)) * rank(open - delay(low, 1))",
        category: Reversal,
        columns: ["open", "high", "low", "close"],
        lookback: 1,
        compute: |p| {
            let open = p.col("open")?;
            let high = p.delay(p.col("high")?, 1);
            let close = p.delay(p.col("close")?, 1);
            let low = p.delay(p.col("low")?, 1);
            -p.rank(&(open - &high)) * p.rank(&(open - &close)) * p.rank(&(open - &low))
        }
    }
}

alpha! {
    /// Alpha#23: fade a two-day rise in the high when the high exceeds the
    /// 20-day mean close.
    Alpha023 {
        description: "where(sum(close, 20) / 20 < high, -delta(high, 2), 0)",
        category: Reversal,
        columns: ["high", "close"],
        lookback: 20,
        compute: |p| {
            let high = p.col("high")?;
            let mean = p.ts_sum(p.col("close")?, 20) / 20.0;
            let faded = -p.delta(high, 2);
            select(&lt(&mean, high), &faded, 0.0)
        }
    }
}

alpha! {
    Alpha031 {
        description: "rank(decay_linear(-rank(delta(close, 10)), 10)) + rank(-delta(close, 3)) + sign(rank(correlation(adv20, low, 12)))",
        category: Reversal,
        columns: ["close", "volume", "low"],
        lookback: 20,
        compute: |p| {
            let close = p.col("close")?;
            let adv20 = p.adv(p.col("volume")?, 20);
            let a = p.rank(&p.decay_linear(&-p.rank(&p.delta(close, 10)), 10));
            let b = p.rank(&-p.delta(close, 3));
            let c = sign(&p.rank(&p.ts_corr(&adv20, p.col("low")?, 12)));
            a + b + c
        }
    }
}

alpha! {
    /// Alpha#33: rank of the intraday return sign-flipped.
    Alpha033 {
        description: "rank(-(1 - open / close))",
        category: Reversal,
        columns: ["open", "close"],
        lookback: 0,
        compute: |p| {
            let ratio = p.col("open")? / p.col("close")?;
            p.rank(&-(1.0 - ratio))
        }
    }
}

alpha! {
    Alpha038 {
        description: "-ts_rank(close, 10) * rank(close / open)",
        category: Reversal,
        columns: ["close", "open"],
        lookback: 10,
        compute: |p| {
            let close = p.col("close")?;
            let ratio = close / p.col("open")?;
            -p.ts_rank(close, 10) * p.rank(&ratio)
        }
    }
}

alpha! {
    /// Alpha#41: geometric mid-price against VWAP.
    Alpha041 {
        description: "(high * low)^0.5 - vwap",
        category: Reversal,
        columns: ["high", "low", "vwap"],
        lookback: 0,
        compute: |p| {
            let mid = powf(&(p.col("high")? * p.col("low")?), 0.5);
            mid - p.col("vwap")?
        }
    }
}

alpha! {
    Alpha042 {
        description: "rank(vwap - close) / rank(vwap + close)",
        category: Reversal,
        columns: ["vwap", "close"],
        lookback: 0,
        compute: |p| {
            let vwap = p.col("vwap")?;
            let close = p.col("close")?;
            p.rank(&(vwap - close)) / p.rank(&(vwap + close))
        }
    }
}

alpha! {
    /// Alpha#53: 9-day change in where the close sits within the bar.
    Alpha053 {
        description: "-delta(((close - low) - (high - close)) / (close - low), 9)",
        category: Reversal,
        columns: ["close", "low", "high"],
        lookback: 9,
        compute: |p| {
            let close = p.col("close")?;
            let low = p.col("low")?;
            let high = p.col("high")?;
            let location = div(&((close - low) - (high - close)), &(close - low));
            -p.delta(&location, 9)
        }
    }
}

alpha! {
    Alpha054 {
        description: "-((low - close) * open^5) / ((low - high) * close^5)",
        category: Reversal,
        columns: ["low", "close", "open", "high"],
        lookback: 0,
        compute: |p| {
            let low = p.col("low")?;
            let close = p.col("close")?;
            let numerator = (low - close) * powf(p.col("open")?, 5.0);
            let denominator = (low - p.col("high")?) * powf(close, 5.0);
            -(numerator / denominator)
        }
    }
}

alpha! {
    /// Alpha#60: decayed volume-weighted close location against the close's
    /// time-series rank.
    Alpha060 {
        description: "-(2 * rank(decay_linear(((close - low) - (high - close)) / (high - low) * volume, 10)) - rank(ts_rank(close, 10)))",
        category: Reversal,
        columns: ["high", "low", "close", "volume"],
        lookback: 10,
        compute: |p| {
            let close = p.col("close")?;
            let low = p.col("low")?;
            let high = p.col("high")?;
            let location = div(&((close - low) - (high - close)), &(high - low));
            let weighted = location * p.col("volume")?;
            let a = 2.0 * p.rank(&p.decay_linear(&weighted, 10));
            -(a - p.rank(&p.ts_rank(close, 10)))
        }
    }
}

alpha! {
    Alpha083 {
        description: "rank(delay((high - low) / (sum(close, 5) / 5), 2)) * rank(rank(volume)) / (((high - low) / (sum(close, 5) / 5)) / (vwap - close))",
        category: Reversal,
        columns: ["high", "low", "close", "vwap", "volume"],
        lookback: 5,
        compute: |p| {
            let close = p.col("close")?;
            let range = p.col("high")? - p.col("low")?;
            let relative = range / (p.ts_sum(close, 5) / 5.0);
            let numerator =
                p.rank(&p.delay(&relative, 2)) * p.rank(&p.rank(p.col("volume")?));
            let denominator = div(&relative, &(p.col("vwap")? - close));
            div(&numerator, &denominator)
        }
    }
}

alpha! {
    /// Alpha#101: intraday return normalised by the bar's range.
    Alpha101 {
        description: "(close - open) / ((high - low) + 0.001)",
        category: Reversal,
        columns: ["open", "high", "low", "close"],
        lookback: 0,
        compute: |p| {
            let body = p.col("close")? - p.col("open")?;
            let range = p.col("high")? - p.col("low")? + 0.001;
            body / range
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphas::fixtures::feature_panel;
    use crate::{Factor, FactorCategory, Panel};
    use approx::assert_relative_eq;
    use polars::df;

    #[test]
    fn test_alpha101_matches_formula() {
        let df = df! {
            "datetime" => ["2024-01-02", "2024-01-02"],
            "symbol" => ["A", "B"],
            "open" => [10.0, 20.0],
            "high" => [12.0, 21.0],
            "low" => [9.0, 19.0],
            "close" => [11.5, 19.5],
        }
        .unwrap();
        let panel = Panel::new(&df).unwrap();
        let values = Alpha101.compute_raw(&panel).unwrap();
        assert_relative_eq!(values[0], 1.5 / 3.001, epsilon = 1e-12);
        assert_relative_eq!(values[1], -0.5 / 2.001, epsilon = 1e-12);
    }

    #[test]
    fn test_alpha033_ranks_intraday_return() {
        let df = df! {
            "datetime" => ["2024-01-02", "2024-01-02", "2024-01-02"],
            "symbol" => ["A", "B", "C"],
            "open" => [10.0, 10.0, 10.0],
            "close" => [11.0, 9.0, 10.0],
        }
        .unwrap();
        let panel = Panel::new(&df).unwrap();
        let values = Alpha033.compute_raw(&panel).unwrap();
        // A has the lowest sign-flipped return, B the highest
        assert_eq!(values, vec![1.0 / 3.0, 1.0, 2.0 / 3.0]);
    }

    #[test]
    fn test_alpha012_needs_one_prior_bar() {
        let panel = feature_panel(&["AAA", "BBB"], 5);
        let values = Alpha012.compute_raw(&panel).unwrap();
        assert!(values[0].is_nan());
        assert!(values[5].is_nan());
        assert!(values[1].is_finite());
    }

    #[test]
    fn test_alpha001_is_centred() {
        let panel = feature_panel(&["AAA", "BBB", "CCC", "DDD"], 40);
        for v in Alpha001.compute_raw(&panel).unwrap().into_iter().filter(|v| !v.is_nan()) {
            assert!((-0.5..=0.5).contains(&v));
        }
    }

    #[test]
    fn test_metadata() {
        assert_eq!(Alpha053.name(), "Alpha053");
        assert_eq!(Alpha053.category(), FactorCategory::Reversal);
        assert_eq!(Alpha053.lookback(), 9);
        assert_eq!(Alpha053.required_columns(), &["close", "low", "high"]);
    }
}
