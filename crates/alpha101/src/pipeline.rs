//! Batch factor computation.
//!
//! Each requested factor is an independent unit of work. Factors run in
//! parallel against the same read-only [`Panel`] and registry; a failure is
//! logged and recorded without affecting the others.

use crate::{FactorRegistry, Panel, Result};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Outcome of computing one factor.
#[derive(Debug)]
pub struct FactorOutcome {
    /// Requested factor name
    pub name: String,
    /// `datetime, symbol, value` frame, or the error that stopped it
    pub result: Result<DataFrame>,
}

/// Outcomes of a batch run, in request order.
#[derive(Debug, Default)]
pub struct FactorRun {
    outcomes: Vec<FactorOutcome>,
}

impl FactorRun {
    /// All outcomes in request order.
    pub fn outcomes(&self) -> &[FactorOutcome] {
        &self.outcomes
    }

    /// Consume the run, yielding its outcomes.
    pub fn into_outcomes(self) -> Vec<FactorOutcome> {
        self.outcomes
    }

    /// Names of factors that produced a frame.
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Names of factors that failed.
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Computed frame for `name`, if it succeeded.
    pub fn frame(&self, name: &str) -> Option<&DataFrame> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.result.as_ref().ok())
    }
}

/// Compute every factor in `names` against `panel`.
///
/// Unknown names and contract violations (missing columns) are recorded as
/// failed outcomes and logged at `warn`.
pub fn compute_factors<S>(registry: &FactorRegistry, panel: &Panel, names: &[S]) -> FactorRun
where
    S: AsRef<str> + Sync,
{
    let outcomes = names
        .par_iter()
        .map(|name| {
            let name = name.as_ref();
            let result = registry.get(name).and_then(|factor| factor.compute(panel));
            match &result {
                Ok(frame) => debug!(factor = name, rows = frame.height(), "computed factor"),
                Err(e) => warn!(factor = name, error = %e, "factor failed, skipping"),
            }
            FactorOutcome {
                name: name.to_string(),
                result,
            }
        })
        .collect();

    FactorRun { outcomes }
}

/// Compute every registered factor.
pub fn compute_all(registry: &FactorRegistry, panel: &Panel) -> FactorRun {
    compute_factors(registry, panel, &registry.names())
}
