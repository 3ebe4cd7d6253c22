//! Error types for factor computations.

use thiserror::Error;

/// Result type for factor operations.
pub type Result<T> = std::result::Result<T, FactorError>;

/// Errors that can occur during factor computation.
///
/// Numeric undefinedness (short history, degenerate cross-sections) is never
/// an error; it is carried as NaN in the computed values. These variants cover
/// contract violations only.
#[derive(Debug, Error)]
pub enum FactorError {
    /// Missing required column in input data
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A factor with the same name is already registered
    #[error("Duplicate factor registration: {0}")]
    DuplicateFactor(String),

    /// Factor not found in registry
    #[error("Factor not found: {0}")]
    NotFound(String),

    /// Panel keys are null, unparseable or not unique
    #[error("Invalid panel: {0}")]
    InvalidPanel(String),

    /// A parameter is outside its valid domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}
