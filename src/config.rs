//! Aggregation settings and thread pool setup.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PARALLEL_MIN_CHILDREN;
use crate::error::AeroError;

/// Settings for the bottom-up aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Merge independent child subtrees on the rayon pool.
    pub parallel: bool,
    /// Only fan out when a component has at least this many children.
    pub parallel_min_children: usize,
    /// Size of the global rayon pool; `None` leaves rayon's default.
    pub num_threads: Option<usize>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_min_children: DEFAULT_PARALLEL_MIN_CHILDREN,
            num_threads: None,
        }
    }
}

impl AggregationConfig {
    /// Sequential pass, useful for deterministic diagnostics.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, AeroError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AeroError> {
        if self.num_threads == Some(0) {
            return Err(AeroError::InvalidThreadCount);
        }
        Ok(())
    }
}

/// Configure the global rayon pool.
///
/// A zero thread count is rejected. If the global pool was already built the
/// request is logged and ignored; aggregation keeps working on the existing pool.
pub fn configure_thread_pool(num_threads: Option<usize>) -> Result<(), AeroError> {
    let Some(n) = num_threads else {
        return Ok(());
    };
    if n == 0 {
        return Err(AeroError::InvalidThreadCount);
    }

    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        tracing::warn!(threads = n, error = %e, "failed to set thread count, using existing pool");
    }
    Ok(())
}
