#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/alpha101/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod alphas;
pub mod backtest;
pub mod error;
pub mod features;
pub mod ops;
pub mod panel;
pub mod pipeline;
pub mod registry;
pub mod traits;

// Re-export core types
pub use backtest::{BacktestConfig, BacktestReport, IcReport, QuantileReport, run_backtest};
pub use error::{FactorError, Result};
pub use features::{FeatureConfig, build_features};
pub use panel::Panel;
pub use pipeline::{FactorOutcome, FactorRun, compute_all, compute_factors};
pub use registry::{FactorCategory, FactorInfo, FactorRegistry};
pub use traits::Factor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
