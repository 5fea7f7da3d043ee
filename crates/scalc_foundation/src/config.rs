//! Evaluation configuration.
//!
//! These knobs are threaded into every evaluation explicitly so that the
//! interpreter stays reentrant.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for one interpreter instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvalConfig {
    /// Total `UNTIL` iterations allowed per evaluation, shared by every loop
    /// in the expression.
    pub loop_max: u32,

    /// Emit a `tracing` event for every executed instruction.
    pub trace: bool,

    /// Seed for the random number generator behind `RNDM` and `NRNDM`.
    pub seed: u64,
}

impl EvalConfig {
    /// Default iteration budget for `UNTIL` loops.
    pub const DEFAULT_LOOP_MAX: u32 = 1000;

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the loop iteration budget.
    #[must_use]
    pub const fn with_loop_max(mut self, loop_max: u32) -> Self {
        self.loop_max = loop_max;
        self
    }

    /// Enables or disables per-instruction tracing.
    #[must_use]
    pub const fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            loop_max: Self::DEFAULT_LOOP_MAX,
            trace: false,
            seed: 0xa3bf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_loop_budget() {
        assert_eq!(EvalConfig::default().loop_max, 1000);
        assert!(!EvalConfig::default().trace);
    }

    #[test]
    fn builders_chain() {
        let config = EvalConfig::new()
            .with_loop_max(5)
            .with_trace(true)
            .with_seed(7);
        assert_eq!(config.loop_max, 5);
        assert!(config.trace);
        assert_eq!(config.seed, 7);
    }
}
