use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

/// Fallback statistics variant used to smooth sparse Markov-chain rows.
///
/// The accepted configuration names are `"transitions"` and `"states"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccumulatorKind {
    /// Bucket transitions by signed length `destination − source`.
    TransitionLength,
    /// Count how often each destination state is entered, ignoring sources.
    DestinationState,
}

impl AccumulatorKind {
    /// Configuration name of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccumulatorKind::TransitionLength => "transitions",
            AccumulatorKind::DestinationState => "states",
        }
    }
}

impl fmt::Display for AccumulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccumulatorKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transitions" => Ok(AccumulatorKind::TransitionLength),
            "states" => Ok(AccumulatorKind::DestinationState),
            other => Err(CacheError::InvalidParameter(format!(
                "unknown stats accumulator type: {other}"
            ))),
        }
    }
}

/// Cache controller configuration.
///
/// Defaults: capacity 512, the transition-length accumulator, access
/// threshold 5, forecast length 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Upper bound on the total size of resident items.
    pub cache_capacity: f32,
    /// Fallback statistics variant.
    pub accumulator: AccumulatorKind,
    /// Below this per-state access count, a chain row falls back to the
    /// accumulator estimate.
    pub accesses_threshold: usize,
    /// Number of single-step predictions summed to form the cost signal.
    /// Must be at least 1.
    pub forecast_length: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 512.0,
            accumulator: AccumulatorKind::TransitionLength,
            accesses_threshold: 5,
            forecast_length: 1,
        }
    }
}

impl CacheConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), CacheError> {
        if !self.cache_capacity.is_finite() || self.cache_capacity <= 0.0 {
            return Err(CacheError::InvalidParameter(
                "cache_capacity must be positive and finite".into(),
            ));
        }

        if self.forecast_length == 0 {
            return Err(CacheError::InvalidParameter(
                "forecast_length must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
