//! Operator library - NaN-aware primitive transforms.
//!
//! Time-series operators take one symbol's time-ordered sequence (or two
//! aligned sequences) and return a sequence of the same length and
//! alignment. Cross-sectional operators take the members of one timestamp.
//! None of them fail: an undefined statistic is NaN, which lets factor
//! formulas compose operators without checks between steps.
//!
//! Use [`Panel`](crate::Panel) to apply these under the correct grouping.

pub mod cross_section;
pub mod price;
pub mod rolling;
pub mod time_series;

pub use cross_section::{average_ranks, cs_rank, cs_zscore};
pub use price::{adv, returns, vwap_from_amount};
pub use rolling::{rolling_corr, rolling_cov, rolling_max, rolling_mean, rolling_min, rolling_std, rolling_sum};
pub use time_series::{decay_linear, decay_weights, delay, delta, ts_argmin, ts_rank};
