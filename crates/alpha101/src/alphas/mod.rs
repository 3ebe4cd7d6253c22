//! Alpha101 factor formulas.
//!
//! Each formula is a unit struct implementing [`Factor`](crate::Factor),
//! composed from [`expr::PanelOps`] and the elementwise helpers in [`expr`].
//! Window lengths are integers; fractional windows of the published formulas
//! are truncated.

pub mod expr;

/// Declare a unit-struct factor from its metadata and formula body.
///
/// The body is a block evaluating to an `Array1<f64>` aligned with the panel
/// rows; `?` inside it propagates from `compute_raw`.
macro_rules! alpha {
    (
        $(#[$meta:meta])*
        $name:ident {
            description: $description:literal,
            category: $category:ident,
            columns: [$($column:literal),* $(,)?],
            lookback: $lookback:literal,
            compute: |$p:ident| $body:block $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $crate::Factor for $name {
            fn name(&self) -> &str {
                stringify!($name)
            }

            fn description(&self) -> &str {
                $description
            }

            fn category(&self) -> $crate::FactorCategory {
                $crate::FactorCategory::$category
            }

            fn required_columns(&self) -> &[&str] {
                &[$($column),*]
            }

            fn lookback(&self) -> usize {
                $lookback
            }

            fn compute_raw(&self, panel: &$crate::Panel) -> $crate::Result<Vec<f64>> {
                let $p = $crate::alphas::expr::PanelOps::new(panel);
                let values: ::ndarray::Array1<f64> = $body;
                Ok(values.to_vec())
            }
        }
    };
}

pub mod correlation;
pub mod liquidity;
pub mod momentum;
pub mod reversal;
pub mod volatility;
