// In: src/config.rs

//! The single source of truth for resolver configuration.
//!
//! `LyneConfig` is created once at the application boundary (a JSON document
//! or plain defaults) and shared read-only through `Arc<LyneConfig>` by every
//! `Resolver` that needs it.

use serde::{Deserialize, Serialize};

use crate::error::LyneError;

//==================================================================================
// I. Policy Enums
//==================================================================================

/// What `assign` does when handed the empty (root) chain.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyAssignment {
    /// **Default:** no write happens; the original context is returned and the
    /// supplied value is discarded.
    #[default]
    Ignore,

    /// Treat assignment to the whole context as a `NotAssignable` failure.
    Reject,
}

//==================================================================================
// II. The Unified LyneConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LyneConfig {
    /// Upper bound on how deeply chains may be nested inside operation
    /// arguments before resolution gives up.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    /// If true, every replayed step is logged at `trace` level.
    #[serde(default)]
    pub trace_resolution: bool,

    #[serde(default)]
    pub empty_assignment: EmptyAssignment,
}

impl Default for LyneConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_nesting_depth(),
            trace_resolution: false,
            empty_assignment: EmptyAssignment::default(),
        }
    }
}

impl LyneConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, LyneError> {
        let config: LyneConfig = serde_json::from_str(json)?;
        if config.max_nesting_depth == 0 {
            return Err(LyneError::Config(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        log::debug!("loaded resolver config: {:?}", config);
        Ok(config)
    }
}

/// Provides the default for `max_nesting_depth` for serde.
fn default_max_nesting_depth() -> usize {
    32
}
