//! Formula building blocks.
//!
//! [`PanelOps`] applies every time-series operator under a fresh per-symbol
//! grouping and every rank per timestamp, so a formula can nest operators on
//! intermediate series without leaking across symbols. The free functions are
//! elementwise and NaN-propagating.

use crate::{Panel, Result, ops};
use ndarray::{Array1, Zip};

/// Grouped operator application over one panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelOps<'p> {
    panel: &'p Panel,
}

impl<'p> PanelOps<'p> {
    /// Wrap a panel.
    pub const fn new(panel: &'p Panel) -> Self {
        Self { panel }
    }

    /// Numeric input column.
    pub fn col(&self, name: &str) -> Result<&'p Array1<f64>> {
        self.panel.column(name)
    }

    /// Rolling sum per symbol.
    pub fn ts_sum(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::rolling_sum(s, window))
    }

    /// Rolling mean per symbol.
    pub fn ts_mean(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::rolling_mean(s, window))
    }

    /// Rolling minimum per symbol.
    pub fn ts_min(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::rolling_min(s, window))
    }

    /// Rolling maximum per symbol.
    pub fn ts_max(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::rolling_max(s, window))
    }

    /// Rolling population standard deviation per symbol.
    pub fn ts_std(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::rolling_std(s, window))
    }

    /// Rolling sample covariance per symbol.
    pub fn ts_cov(&self, x: &Array1<f64>, y: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel
            .per_symbol_pair(x, y, |a, b| ops::rolling_cov(a, b, window))
    }

    /// Rolling correlation per symbol.
    pub fn ts_corr(&self, x: &Array1<f64>, y: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel
            .per_symbol_pair(x, y, |a, b| ops::rolling_corr(a, b, window))
    }

    /// Trailing-window percentile rank per symbol.
    pub fn ts_rank(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::ts_rank(s, window))
    }

    /// 1-based position of the trailing-window minimum per symbol.
    pub fn ts_argmin(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::ts_argmin(s, window))
    }

    /// Linearly decayed average per symbol.
    pub fn decay_linear(&self, x: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::decay_linear(s, window))
    }

    /// Lag per symbol.
    pub fn delay(&self, x: &Array1<f64>, n: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::delay(s, n))
    }

    /// Difference against the lag per symbol.
    pub fn delta(&self, x: &Array1<f64>, n: usize) -> Array1<f64> {
        self.panel.per_symbol(x, |s| ops::delta(s, n))
    }

    /// Average daily volume per symbol.
    pub fn adv(&self, volume: &Array1<f64>, window: usize) -> Array1<f64> {
        self.panel.per_symbol(volume, |s| ops::adv(s, window))
    }

    /// Cross-sectional percentile rank.
    pub fn rank(&self, x: &Array1<f64>) -> Array1<f64> {
        self.panel.cs_rank(x)
    }
}

/// Either a scalar or a panel-aligned series.
pub trait Operand: Copy {
    /// Value at row `i`.
    fn at(self, i: usize) -> f64;
}

impl Operand for f64 {
    fn at(self, _: usize) -> f64 {
        self
    }
}

impl Operand for &Array1<f64> {
    fn at(self, i: usize) -> f64 {
        self[i]
    }
}

fn compare(a: &Array1<f64>, b: impl Operand, op: impl Fn(f64, f64) -> bool) -> Array1<f64> {
    (0..a.len())
        .map(|i| {
            let (x, y) = (a[i], b.at(i));
            if x.is_nan() || y.is_nan() {
                f64::NAN
            } else if op(x, y) {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// `1.0` where `a < b`, `0.0` otherwise, NaN if either side is NaN.
pub fn lt(a: &Array1<f64>, b: impl Operand) -> Array1<f64> {
    compare(a, b, |x, y| x < y)
}

/// `1.0` where `a <= b`.
pub fn le(a: &Array1<f64>, b: impl Operand) -> Array1<f64> {
    compare(a, b, |x, y| x <= y)
}

/// `1.0` where `a > b`.
pub fn gt(a: &Array1<f64>, b: impl Operand) -> Array1<f64> {
    compare(a, b, |x, y| x > y)
}

/// `1.0` where `a >= b`.
pub fn ge(a: &Array1<f64>, b: impl Operand) -> Array1<f64> {
    compare(a, b, |x, y| x >= y)
}

/// `1.0` where `a != b`.
pub fn ne(a: &Array1<f64>, b: impl Operand) -> Array1<f64> {
    compare(a, b, |x, y| x != y)
}

/// Pick `then` where `cond` is non-zero and `otherwise` where it is zero.
/// A NaN condition yields NaN.
pub fn select(cond: &Array1<f64>, then: impl Operand, otherwise: impl Operand) -> Array1<f64> {
    (0..cond.len())
        .map(|i| match cond[i] {
            c if c.is_nan() => f64::NAN,
            c if c != 0.0 => then.at(i),
            _ => otherwise.at(i),
        })
        .collect()
}

/// Elementwise maximum; NaN if either side is NaN.
pub fn maximum(a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
    Zip::from(a).and(b).map_collect(|&x, &y| {
        if x.is_nan() || y.is_nan() {
            f64::NAN
        } else {
            x.max(y)
        }
    })
}

/// Sign in `{-1, 0, 1}`; NaN stays NaN.
pub fn sign(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| {
        if v > 0.0 {
            1.0
        } else if v < 0.0 {
            -1.0
        } else {
            // zero or NaN
            v * 0.0
        }
    })
}

/// Elementwise absolute value.
pub fn abs(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(f64::abs)
}

/// Elementwise power with a scalar exponent.
pub fn powf(x: &Array1<f64>, exponent: f64) -> Array1<f64> {
    x.mapv(|v| v.powf(exponent))
}

/// Elementwise power with a series exponent.
pub fn pow(base: &Array1<f64>, exponent: &Array1<f64>) -> Array1<f64> {
    Zip::from(base)
        .and(exponent)
        .map_collect(|&b, &e| b.powf(e))
}

/// Division with a zero divisor mapped to NaN instead of infinity.
pub fn div(numerator: &Array1<f64>, denominator: &Array1<f64>) -> Array1<f64> {
    Zip::from(numerator)
        .and(denominator)
        .map_collect(|&n, &d| if d == 0.0 { f64::NAN } else { n / d })
}
