//! Core trait definitions for factors.
//!
//! All factors implement the [`Factor`] trait, which provides a unified interface
//! for computing factor values from a [`Panel`].

use crate::{FactorCategory, Panel, Result};
use polars::prelude::*;

/// A factor that can be computed from a daily price panel.
///
/// Factors are stateless: the same panel always produces the same values,
/// and computing never mutates the panel.
pub trait Factor: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this factor, e.g. `Alpha001`.
    ///
    /// Used for registry lookup and output naming.
    fn name(&self) -> &str;

    /// Human-readable description of the formula.
    fn description(&self) -> &str;

    /// Factor category for grouping and analysis.
    fn category(&self) -> FactorCategory;

    /// Columns required in the input panel.
    ///
    /// Checked by [`Factor::validate`]; callers of [`Factor::compute_raw`]
    /// skip the check at their own risk.
    fn required_columns(&self) -> &[&str];

    /// Longest trailing window the formula references, in trading days.
    fn lookback(&self) -> usize;

    /// Compute one value per panel row, aligned to the panel's row order.
    ///
    /// Insufficient history and degenerate cross-sections are NaN.
    fn compute_raw(&self, panel: &Panel) -> Result<Vec<f64>>;

    /// Check that every required column exists.
    fn validate(&self, panel: &Panel) -> Result<()> {
        panel.require(self.required_columns())
    }

    /// Validate, compute and return a `datetime, symbol, value` frame.
    fn compute(&self, panel: &Panel) -> Result<DataFrame> {
        self.validate(panel)?;
        let values = self.compute_raw(panel)?;
        panel.factor_frame(&values)
    }
}
