//! Price-volume correlation formulas.

use super::expr::*;

alpha! {
    /// Alpha#3: negative 10-day correlation of open and volume ranks.
    Alpha003 {
        description: "-correlation(rank(open), rank(volume), 10)",
        category: Correlation,
        columns: ["open", "volume"],
        lookback: 10,
        compute: |p| {
            -p.ts_corr(&p.rank(p.col("open")?), &p.rank(p.col("volume")?), 10)
        }
    }
}

alpha! {
    /// Alpha#6: negative 10-day correlation of open and volume.
    Alpha006 {
        description: "-correlation(open, volume, 10)",
        category: Correlation,
        columns: ["open", "volume"],
        lookback: 10,
        compute: |p| {
            -p.ts_corr(p.col("open")?, p.col("volume")?, 10)
        }
    }
}

alpha! {
    Alpha013 {
        description: "-covariance(rank(close), rank(volume), 5)",
        category: Correlation,
        columns: ["close", "volume"],
        lookback: 5,
        compute: |p| {
            -p.ts_cov(&p.rank(p.col("close")?), &p.rank(p.col("volume")?), 5)
        }
    }
}

alpha! {
    Alpha014 {
        description: "-rank(delta(returns, 3)) * correlation(open, volume, 10)",
        category: Correlation,
        columns: ["open", "volume", "returns"],
        lookback: 10,
        compute: |p| {
            let shock = -p.rank(&p.delta(p.col("returns")?, 3));
            shock * p.ts_corr(p.col("open")?, p.col("volume")?, 10)
        }
    }
}

alpha! {
    Alpha016 {
        description: "-covariance(rank(high), rank(volume), 5)",
        category: Correlation,
        columns: ["high", "volume"],
        lookback: 5,
        compute: |p| {
            -p.ts_cov(&p.rank(p.col("high")?), &p.rank(p.col("volume")?), 5)
        }
    }
}

alpha! {
    /// Alpha#26: peak recent correlation between volume and high timing.
    Alpha026 {
        description: "-ts_max(correlation(ts_rank(volume, 5), ts_rank(high, 5), 5), 3)",
        category: Correlation,
        columns: ["volume", "high"],
        lookback: 5,
        compute: |p| {
            let volume_rank = p.ts_rank(p.col("volume")?, 5);
            let high_rank = p.ts_rank(p.col("high")?, 5);
            -p.ts_max(&p.ts_corr(&volume_rank, &high_rank, 5), 3)
        }
    }
}

alpha! {
    Alpha032 {
        description: "rank(sum(close, 7) / 7 - close) + 20 * rank(correlation(vwap, delay(close, 5), 230))",
        category: Correlation,
        columns: ["close", "vwap"],
        lookback: 230,
        compute: |p| {
            let close = p.col("close")?;
            let stretch = p.ts_sum(close, 7) / 7.0 - close;
            let corr = p.ts_corr(p.col("vwap")?, &p.delay(close, 5), 230);
            p.rank(&stretch) + 20.0 * p.rank(&corr)
        }
    }
}

alpha! {
    /// Alpha#36: weighted blend of five ranked price-volume terms.
    Alpha036 {
        description: "2.21 * rank(correlation(close - open, delay(volume, 1), 15)) + 0.7 * rank(open - close) + 0.73 * rank(ts_rank(delay(-returns, 6), 5)) + rank(abs(correlation(vwap, adv20, 6))) + 0.6 * rank((sum(close, 200) / 200 - open) * (close - open))",
        category: Correlation,
        columns: ["close", "open", "volume", "vwap", "returns"],
        lookback: 200,
        compute: |p| {
            let close = p.col("close")?;
            let open = p.col("open")?;
            let volume = p.col("volume")?;
            let body = close - open;

            let a = 2.21 * p.rank(&p.ts_corr(&body, &p.delay(volume, 1), 15));
            let b = 0.7 * p.rank(&(open - close));
            let returns = p.col("returns")?;
            let lagged_reversal = p.delay(&-returns, 6);
            let c = 0.73 * p.rank(&p.ts_rank(&lagged_reversal, 5));
            let d = p.rank(&abs(&p.ts_corr(p.col("vwap")?, &p.adv(volume, 20), 6)));
            let long_gap = p.ts_sum(close, 200) / 200.0 - open;
            let e = 0.6 * p.rank(&(long_gap * &body));
            a + b + c + d + e
        }
    }
}

alpha! {
    Alpha037 {
        description: "rank(correlation(delay(open - close, 1), close, 200)) + rank(open - close)",
        category: Correlation,
        columns: ["open", "close"],
        lookback: 200,
        compute: |p| {
            let close = p.col("close")?;
            let gap = p.col("open")? - close;
            let corr = p.ts_corr(&p.delay(&gap, 1), close, 200);
            p.rank(&corr) + p.rank(&gap)
        }
    }
}

alpha! {
    Alpha044 {
        description: "-correlation(high, rank(volume), 5)",
        category: Correlation,
        columns: ["high", "volume"],
        lookback: 5,
        compute: |p| {
            -p.ts_corr(p.col("high")?, &p.rank(p.col("volume")?), 5)
        }
    }
}

alpha! {
    Alpha045 {
        description: "-(rank(sum(delay(close, 5), 20) / 20) * correlation(close, volume, 2) * rank(correlation(sum(close, 5), sum(close, 20), 2)))",
        category: Correlation,
        columns: ["close", "volume"],
        lookback: 20,
        compute: |p| {
            let close = p.col("close")?;
            let a = p.rank(&(p.ts_sum(&p.delay(close, 5), 20) / 20.0));
            let b = p.ts_corr(close, p.col("volume")?, 2);
            let c = p.ts_corr(&p.ts_sum(close, 5), &p.ts_sum(close, 20), 2);
            -(a * b * p.rank(&c))
        }
    }
}

alpha! {
    Alpha050 {
        description: "-ts_max(rank(correlation(rank(volume), rank(vwap), 5)), 5)",
        category: Correlation,
        columns: ["volume", "vwap"],
        lookback: 5,
        compute: |p| {
            let corr = p.ts_corr(&p.rank(p.col("volume")?), &p.rank(p.col("vwap")?), 5);
            -p.ts_max(&p.rank(&corr), 5)
        }
    }
}

alpha! {
    /// Alpha#55: correlation between the close's position in its 12-day
    /// range and volume, both ranked.
    Alpha055 {
        description: "-correlation(rank((close - ts_min(low, 12)) / (ts_max(high, 12) - ts_min(low, 12))), rank(volume), 6)",
        category: Correlation,
        columns: ["close", "high", "low", "volume"],
        lookback: 12,
        compute: |p| {
            let low_min = p.ts_min(p.col("low")?, 12);
            let high_max = p.ts_max(p.col("high")?, 12);
            let stochastic = div(&(p.col("close")? - &low_min), &(high_max - &low_min));
            -p.ts_corr(&p.rank(&stochastic), &p.rank(p.col("volume")?), 6)
        }
    }
}

alpha! {
    Alpha061 {
        description: "rank(vwap - ts_min(vwap, 16)) < rank(correlation(vwap, adv180, 17))",
        category: Correlation,
        columns: ["vwap", "volume"],
        lookback: 180,
        compute: |p| {
            let vwap = p.col("vwap")?;
            let adv180 = p.adv(p.col("volume")?, 180);
            let a = p.rank(&(vwap - &p.ts_min(vwap, 16)));
            let b = p.rank(&p.ts_corr(vwap, &adv180, 17));
            lt(&a, &b)
        }
    }
}

alpha! {
    Alpha064 {
        description: "-(rank(correlation(open * 0.178404 + low * (1 - 0.178404), adv120, 16)) < rank(delta((high + low) / 2 * 0.178404 + vwap * (1 - 0.178404), 3)))",
        category: Correlation,
        columns: ["open", "high", "low", "vwap", "volume"],
        lookback: 120,
        compute: |p| {
            const WEIGHT: f64 = 0.178404;
            let low = p.col("low")?;
            let blended_open = WEIGHT * p.col("open")? + (1.0 - WEIGHT) * low;
            let adv120 = p.adv(p.col("volume")?, 120);
            let a = p.rank(&p.ts_corr(&blended_open, &adv120, 16));

            let mid = (p.col("high")? + low) / 2.0;
            let blended_mid = WEIGHT * mid + (1.0 - WEIGHT) * p.col("vwap")?;
            let b = p.rank(&p.delta(&blended_mid, 3));
            lt(&a, &b) * -1.0
        }
    }
}

alpha! {
    Alpha065 {
        description: "-(rank(correlation(open * 0.00817205 + vwap * (1 - 0.00817205), adv60, 6)) < rank(open - ts_min(open, 13)))",
        category: Correlation,
        columns: ["open", "vwap", "volume"],
        lookback: 60,
        compute: |p| {
            const WEIGHT: f64 = 0.00817205;
            let open = p.col("open")?;
            let blended = WEIGHT * open + (1.0 - WEIGHT) * p.col("vwap")?;
            let adv60 = p.adv(p.col("volume")?, 60);
            let a = p.rank(&p.ts_corr(&blended, &adv60, 6));
            let b = p.rank(&(open - &p.ts_min(open, 13)));
            lt(&a, &b) * -1.0
        }
    }
}

alpha! {
    Alpha071 {
        description: "max(ts_rank(decay_linear(ts_rank(close, 3), 4), 15), ts_rank(decay_linear(rank((low + open - 2 * vwap)^2), 16), 4))",
        category: Correlation,
        columns: ["close", "low", "open", "vwap"],
        lookback: 16,
        compute: |p| {
            let close_timing = p.decay_linear(&p.ts_rank(p.col("close")?, 3), 4);
            let a = p.ts_rank(&close_timing, 15);

            let vwap = p.col("vwap")?;
            let gap = p.col("low")? + p.col("open")? - (vwap + vwap);
            let b = p.ts_rank(&p.decay_linear(&p.rank(&powf(&gap, 2.0)), 16), 4);
            maximum(&a, &b)
        }
    }
}

alpha! {
    Alpha085 {
        description: "rank(correlation(high * 0.876703 + close * (1 - 0.876703), adv30, 9))^rank(correlation(ts_rank((high + low) / 2, 3), ts_rank(volume, 10), 7))",
        category: Correlation,
        columns: ["high", "low", "close", "volume"],
        lookback: 30,
        compute: |p| {
            const WEIGHT: f64 = 0.876703;
            let high = p.col("high")?;
            let volume = p.col("volume")?;
            let blended = WEIGHT * high + (1.0 - WEIGHT) * p.col("close")?;
            let a = p.ts_corr(&blended, &p.adv(volume, 30), 9);

            let mid = (high + p.col("low")?) / 2.0;
            let b = p.ts_corr(&p.ts_rank(&mid, 3), &p.ts_rank(volume, 10), 7);
            pow(&p.rank(&a), &p.rank(&b))
        }
    }
}

alpha! {
    Alpha086 {
        description: "-(ts_rank(correlation(close, adv20, 6), 20) < rank((open + close) - (vwap + open)))",
        category: Correlation,
        columns: ["close", "open", "vwap", "volume"],
        lookback: 20,
        compute: |p| {
            let close = p.col("close")?;
            let open = p.col("open")?;
            let adv20 = p.adv(p.col("volume")?, 20);
            let a = p.ts_rank(&p.ts_corr(close, &adv20, 6), 20);
            let b = p.rank(&((open + close) - (p.col("vwap")? + open)));
            lt(&a, &b) * -1.0
        }
    }
}

alpha! {
    Alpha094 {
        description: "-rank(vwap - ts_min(vwap, 11))^ts_rank(correlation(ts_rank(vwap, 19), ts_rank(adv60, 4), 18), 2)",
        category: Correlation,
        columns: ["vwap", "volume"],
        lookback: 60,
        compute: |p| {
            let vwap = p.col("vwap")?;
            let adv60 = p.adv(p.col("volume")?, 60);
            let a = p.rank(&(vwap - &p.ts_min(vwap, 11)));
            let corr = p.ts_corr(&p.ts_rank(vwap, 19), &p.ts_rank(&adv60, 4), 18);
            let b = p.ts_rank(&corr, 2);
            pow(&a, &b) * -1.0
        }
    }
}

alpha! {
    Alpha095 {
        description: "rank(open - ts_min(open, 12)) < rank(correlation(sum((high + low) / 2, 19), adv40, 12)^5)",
        category: Correlation,
        columns: ["open", "high", "low", "volume"],
        lookback: 40,
        compute: |p| {
            let open = p.col("open")?;
            let mid = (p.col("high")? + p.col("low")?) / 2.0;
            let adv40 = p.adv(p.col("volume")?, 40);
            let corr = p.ts_corr(&p.ts_sum(&mid, 19), &adv40, 12);
            let a = p.rank(&powf(&corr, 5.0));
            let b = p.rank(&(open - &p.ts_min(open, 12)));
            lt(&b, &a)
        }
    }
}

alpha! {
    Alpha096 {
        description: "-max(ts_rank(decay_linear(correlation(rank(vwap), rank(volume), 3), 4), 8), ts_rank(decay_linear(ts_rank(correlation(rank(close), adv60, 4), 7), 14), 13))",
        category: Correlation,
        columns: ["vwap", "volume", "close"],
        lookback: 60,
        compute: |p| {
            let volume = p.col("volume")?;
            let rank_corr = p.ts_corr(&p.rank(p.col("vwap")?), &p.rank(volume), 3);
            let a = p.ts_rank(&p.decay_linear(&rank_corr, 4), 8);

            let adv60 = p.adv(volume, 60);
            let close_corr = p.ts_corr(&p.rank(p.col("close")?), &adv60, 4);
            let b = p.ts_rank(&p.decay_linear(&p.ts_rank(&close_corr, 7), 14), 13);
            -maximum(&a, &b)
        }
    }
}

alpha! {
    /// Alpha#98: VWAP/volume correlation minus the timing of the weakest
    /// open/volume correlation.
    Alpha098 {
        description: "rank(correlation(vwap, sum(adv5, 26), 4)) - ts_rank(ts_rank(ts_argmin(correlation(rank(open), adv15, 20), 8), 6), 8)",
        category: Correlation,
        columns: ["vwap", "volume", "open"],
        lookback: 26,
        compute: |p| {
            let volume = p.col("volume")?;
            let adv5 = p.adv(volume, 5);
            let a = p.rank(&p.ts_corr(p.col("vwap")?, &p.ts_sum(&adv5, 26), 4));

            let corr = p.ts_corr(&p.rank(p.col("open")?), &p.adv(volume, 15), 20);
            let b = p.ts_rank(&p.ts_rank(&p.ts_argmin(&corr, 8), 6), 8);
            a - b
        }
    }
}

alpha! {
    Alpha099 {
        description: "-(rank(correlation(sum((high + low) / 2, 19), adv60, 8)) < rank(correlation(low, volume, 6)))",
        category: Correlation,
        columns: ["high", "low", "volume"],
        lookback: 60,
        compute: |p| {
            let low = p.col("low")?;
            let volume = p.col("volume")?;
            let mid = (p.col("high")? + low) / 2.0;
            let a = p.ts_corr(&p.ts_sum(&mid, 19), &p.adv(volume, 60), 8);
            let b = p.ts_corr(low, volume, 6);
            lt(&p.rank(&a), &p.rank(&b)) * -1.0
        }
    }
}
