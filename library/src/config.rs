//! Engine configuration, loadable from TOML.

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::Deserialize;

use crate::error::{GraphError, GraphResult};

const DEFAULT_VALUE_CACHE_CAPACITY: usize = 1024;
const DEFAULT_HASH_CACHE_CAPACITY: usize = 4096;
const DEFAULT_DIRTY_VISIT_BUDGET: usize = 1_000_000;

/// Tuning knobs for a [`Graph`](crate::graph::Graph).
///
/// ```toml
/// value_cache_capacity = 256
/// hash_cache_capacity = 1024
/// dirty_visit_budget = 10000
/// ```
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of computed values kept in the LRU value store.
    pub value_cache_capacity: usize,
    /// Maximum number of (plug, context) → digest entries.
    pub hash_cache_capacity: usize,
    /// Upper bound on affects/connection edges followed in one dirty pass.
    pub dirty_visit_budget: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            value_cache_capacity: DEFAULT_VALUE_CACHE_CAPACITY,
            hash_cache_capacity: DEFAULT_HASH_CACHE_CAPACITY,
            dirty_visit_budget: DEFAULT_DIRTY_VISIT_BUDGET,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> GraphResult<Self> {
        let config: EngineConfig =
            toml::from_str(source).map_err(|e| GraphError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|e| GraphError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> GraphResult<()> {
        self.value_capacity()?;
        self.hash_capacity()?;
        if self.dirty_visit_budget == 0 {
            return Err(GraphError::Config("dirty_visit_budget must be > 0".into()));
        }
        Ok(())
    }

    pub(crate) fn value_capacity(&self) -> GraphResult<NonZeroUsize> {
        NonZeroUsize::new(self.value_cache_capacity)
            .ok_or_else(|| GraphError::Config("value_cache_capacity must be > 0".into()))
    }

    pub(crate) fn hash_capacity(&self) -> GraphResult<NonZeroUsize> {
        NonZeroUsize::new(self.hash_cache_capacity)
            .ok_or_else(|| GraphError::Config("hash_cache_capacity must be > 0".into()))
    }
}
