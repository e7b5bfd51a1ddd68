//! # markov-cache-rs
//!
//! A variable-size object cache whose eviction policy is driven by an
//! evolving first-order Markov chain over the observed access sequence.
//! On each admission under pressure, resident items are ranked by a
//! forecast-derived probability of near-term re-access weighted by item
//! size, and the cheapest candidates are moved to the non-resident side.
//!
//! The chain grows online as new keys appear. Rows with too few direct
//! observations are smoothed with one of two global fallback statistics:
//! transition-length histograms ([`AccumulatorKind::TransitionLength`]) or
//! destination-state popularity ([`AccumulatorKind::DestinationState`]).
//!
//! Entry point is [`MarkovCache`]; see [`cache`] for the controller
//! semantics and [`chain`] for the forecasting machinery. The `mcache-*`
//! harness binaries replay trace files through the controller and report
//! object and byte hit ratios.
//!
//! Single-threaded by design: every operation completes synchronously and
//! the controller is not meant to be shared across threads.

pub mod types;
pub mod error;
pub mod linalg;
pub mod accumulator;
pub mod chain;
pub mod cache;
pub mod trace;
pub mod metrics;

pub use cache::{CacheDelegate, MarkovCache};
pub use error::CacheError;
pub use types::*;
