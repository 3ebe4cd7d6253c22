//! Factor registry for discovery and introspection.
//!
//! The registry maps factor names to implementations. [`FactorRegistry::with_defaults`]
//! enumerates every formula explicitly; [`FactorRegistry::global`] initialises
//! that set once per process and hands out a read-only reference.

use crate::{Factor, FactorError, Result, alphas};
use derive_more::Display;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Factor category for grouping related factors.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FactorCategory {
    /// Momentum - trend persistence and trend-regime factors
    Momentum,
    /// Reversal - short-horizon mean reversion and intraday location
    Reversal,
    /// Correlation - price/volume co-movement factors
    Correlation,
    /// Volatility - dispersion-driven factors
    Volatility,
    /// Liquidity - volume and turnover factors
    Liquidity,
}

/// Metadata for factor introspection.
#[derive(Debug, Clone, Serialize)]
pub struct FactorInfo {
    /// Factor name (unique identifier)
    pub name: String,
    /// Formula description
    pub description: String,
    /// Factor category
    pub category: FactorCategory,
    /// Required input columns
    pub required_columns: Vec<String>,
    /// Longest trailing window
    pub lookback: usize,
}

impl From<&dyn Factor> for FactorInfo {
    fn from(f: &dyn Factor) -> Self {
        Self {
            name: f.name().to_string(),
            description: f.description().to_string(),
            category: f.category(),
            required_columns: f.required_columns().iter().map(|s| s.to_string()).collect(),
            lookback: f.lookback(),
        }
    }
}

static GLOBAL: OnceLock<FactorRegistry> = OnceLock::new();

/// Registry for factor discovery and lookup.
#[derive(Debug, Default)]
pub struct FactorRegistry {
    factors: HashMap<String, Arc<dyn Factor>>,
}

impl FactorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factors: HashMap::new(),
        }
    }

    /// Register every Alpha101 formula.
    pub fn with_defaults() -> Result<Self> {
        use alphas::{correlation::*, liquidity::*, momentum::*, reversal::*, volatility::*};

        let mut registry = Self::new();

        // Momentum factors
        registry.register(Arc::new(Alpha009))?;
        registry.register(Arc::new(Alpha010))?;
        registry.register(Arc::new(Alpha019))?;
        registry.register(Arc::new(Alpha024))?;
        registry.register(Arc::new(Alpha039))?;
        registry.register(Arc::new(Alpha046))?;
        registry.register(Arc::new(Alpha049))?;
        registry.register(Arc::new(Alpha051))?;
        registry.register(Arc::new(Alpha052))?;
        registry.register(Arc::new(Alpha084))?;

        // Reversal factors
        registry.register(Arc::new(Alpha001))?;
        registry.register(Arc::new(Alpha004))?;
        registry.register(Arc::new(Alpha005))?;
        registry.register(Arc::new(Alpha011))?;
        registry.register(Arc::new(Alpha012))?;
        registry.register(Arc::new(Alpha020))?;
        registry.register(Arc::new(Alpha023))?;
        registry.register(Arc::new(Alpha031))?;
        registry.register(Arc::new(Alpha033))?;
        registry.register(Arc::new(Alpha038))?;
        registry.register(Arc::new(Alpha041))?;
        registry.register(Arc::new(Alpha042))?;
        registry.register(Arc::new(Alpha053))?;
        registry.register(Arc::new(Alpha054))?;
        registry.register(Arc::new(Alpha060))?;
        registry.register(Arc::new(Alpha083))?;
        registry.register(Arc::new(Alpha101))?;

        // Volatility factors
        registry.register(Arc::new(Alpha018))?;
        registry.register(Arc::new(Alpha021))?;
        registry.register(Arc::new(Alpha022))?;
        registry.register(Arc::new(Alpha034))?;
        registry.register(Arc::new(Alpha040))?;

        // Liquidity factors
        registry.register(Arc::new(Alpha025))?;
        registry.register(Arc::new(Alpha030))?;
        registry.register(Arc::new(Alpha035))?;
        registry.register(Arc::new(Alpha043))?;
        registry.register(Arc::new(Alpha047))?;

        // Correlation factors
        registry.register(Arc::new(Alpha003))?;
        registry.register(Arc::new(Alpha006))?;
        registry.register(Arc::new(Alpha013))?;
        registry.register(Arc::new(Alpha014))?;
        registry.register(Arc::new(Alpha016))?;
        registry.register(Arc::new(Alpha026))?;
        registry.register(Arc::new(Alpha032))?;
        registry.register(Arc::new(Alpha036))?;
        registry.register(Arc::new(Alpha037))?;
        registry.register(Arc::new(Alpha044))?;
        registry.register(Arc::new(Alpha045))?;
        registry.register(Arc::new(Alpha050))?;
        registry.register(Arc::new(Alpha055))?;
        registry.register(Arc::new(Alpha061))?;
        registry.register(Arc::new(Alpha064))?;
        registry.register(Arc::new(Alpha065))?;
        registry.register(Arc::new(Alpha071))?;
        registry.register(Arc::new(Alpha085))?;
        registry.register(Arc::new(Alpha086))?;
        registry.register(Arc::new(Alpha094))?;
        registry.register(Arc::new(Alpha095))?;
        registry.register(Arc::new(Alpha096))?;
        registry.register(Arc::new(Alpha098))?;
        registry.register(Arc::new(Alpha099))?;

        Ok(registry)
    }

    /// Process-wide registry holding the default factor set.
    ///
    /// Built on first access and read-only afterwards.
    pub fn global() -> Result<&'static Self> {
        if let Some(registry) = GLOBAL.get() {
            return Ok(registry);
        }
        let registry = Self::with_defaults()?;
        Ok(GLOBAL.get_or_init(|| registry))
    }

    /// Register a factor in the registry.
    ///
    /// Fails with [`FactorError::DuplicateFactor`] if the name is taken; the
    /// existing entry is kept.
    pub fn register(&mut self, factor: Arc<dyn Factor>) -> Result<()> {
        let name = factor.name().to_string();
        if self.factors.contains_key(&name) {
            return Err(FactorError::DuplicateFactor(name));
        }
        self.factors.insert(name, factor);
        Ok(())
    }

    /// Get a factor by name.
    pub fn get(&self, name: &str) -> Result<&dyn Factor> {
        self.factors
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FactorError::NotFound(name.to_string()))
    }

    /// Whether a factor with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factors.contains_key(name)
    }

    /// Get factors by category, sorted by name.
    pub fn by_category(&self, category: FactorCategory) -> Vec<&dyn Factor> {
        let mut factors: Vec<&dyn Factor> = self
            .factors
            .values()
            .filter(|f| f.category() == category)
            .map(|f| f.as_ref())
            .collect();
        factors.sort_by(|a, b| a.name().cmp(b.name()));
        factors
    }

    /// Get all factor metadata, sorted by name.
    pub fn all_info(&self) -> Vec<FactorInfo> {
        self.names()
            .into_iter()
            .filter_map(|name| self.factors.get(name))
            .map(|f| FactorInfo::from(&**f))
            .collect()
    }

    /// Get all factor names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factors.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphas::reversal::Alpha101;

    #[test]
    fn test_defaults_cover_every_formula() {
        let registry = FactorRegistry::with_defaults().unwrap();
        assert_eq!(registry.len(), 61);
        assert!(registry.contains("Alpha001"));
        assert!(registry.contains("Alpha101"));
        assert!(!registry.contains("Alpha002"));

        let names = registry.names();
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = FactorRegistry::new();
        registry.register(Arc::new(Alpha101)).unwrap();
        let err = registry.register(Arc::new(Alpha101)).unwrap_err();
        assert!(matches!(err, FactorError::DuplicateFactor(n) if n == "Alpha101"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let registry = FactorRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get("Alpha999"),
            Err(FactorError::NotFound(n)) if n == "Alpha999"
        ));
    }

    #[test]
    fn test_category_counts() {
        let registry = FactorRegistry::with_defaults().unwrap();
        let count = |c| registry.by_category(c).len();
        assert_eq!(count(FactorCategory::Momentum), 10);
        assert_eq!(count(FactorCategory::Reversal), 17);
        assert_eq!(count(FactorCategory::Volatility), 5);
        assert_eq!(count(FactorCategory::Liquidity), 5);
        assert_eq!(count(FactorCategory::Correlation), 24);
    }

    #[test]
    fn test_global_is_initialised_once() {
        let a = FactorRegistry::global().unwrap();
        let b = FactorRegistry::global().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), 61);
    }

    #[test]
    fn test_info_matches_factor() {
        let registry = FactorRegistry::with_defaults().unwrap();
        let info = registry.all_info();
        assert_eq!(info.len(), 61);
        let first = &info[0];
        assert_eq!(first.name, "Alpha001");
        assert_eq!(first.category, FactorCategory::Reversal);
        assert_eq!(first.required_columns, vec!["returns", "close"]);
    }
}
