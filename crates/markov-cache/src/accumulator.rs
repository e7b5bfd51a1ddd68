//! Fallback transition statistics.
//!
//! An accumulator summarizes every observed transition into a cheap global
//! sketch, and produces an unnormalized per-row probability estimate over the
//! current state set. The chain consults it for rows whose direct
//! observations are below the access threshold.
//!
//! Two variants exist, selected at construction from a closed set; dispatch
//! is a plain `match` rather than a trait object since the set never grows.

use crate::linalg::Vector;
use crate::types::AccumulatorKind;

// ─── Transition-length variant ──────────────────────────────────────

/// Buckets transitions by their signed length `destination − source`.
///
/// Models the belief that transitions of a given distance have consistent
/// frequency irrespective of where they originate.
#[derive(Debug, Clone, Default)]
pub struct TransitionLengthAccumulator {
    /// Forward-transition counts indexed by length. Index 0 is unused.
    forward: Vec<f32>,
    /// Backward-transition counts indexed by absolute length. Index 0 is
    /// unused.
    backward: Vec<f32>,
    /// Count of self transitions (length 0).
    self_transitions: f32,
    /// Total number of accumulated transitions.
    total_transitions: usize,
    num_states: usize,
}

impl TransitionLengthAccumulator {
    fn add_state(&mut self) {
        self.num_states += 1;
        self.forward.push(0.0);
        self.backward.push(0.0);
    }

    fn accumulate_transition(&mut self, from: usize, to: usize) {
        assert!(from < self.num_states);
        assert!(to < self.num_states);

        if from == to {
            self.self_transitions += 1.0;
        } else if from < to {
            self.forward[to - from] += 1.0;
        } else {
            self.backward[from - to] += 1.0;
        }

        self.total_transitions += 1;
    }

    fn estimate_row(&self, state: usize, out: &mut Vector) {
        assert!(state < self.num_states);
        assert_eq!(out.len(), self.num_states);

        // out[j] holds the estimate for the transition state → j, so the
        // backward buckets land left of `state` (largest length first) and
        // the forward buckets right of it.
        for j in 0..state {
            out[j] = self.backward[state - j];
        }
        out[state] = self.self_transitions;
        for j in state + 1..self.num_states {
            out[j] = self.forward[j - state];
        }

        // Scaling by the reciprocal total does not make the row sum to 1.
        out.scale(1.0 / self.total_transitions as f32);
    }

    fn pair_estimate(&self, from: usize, to: usize) -> f32 {
        assert!(from < self.num_states);
        assert!(to < self.num_states);

        let bucket = if from == to {
            self.self_transitions
        } else if from < to {
            self.forward[to - from]
        } else {
            self.backward[from - to]
        };

        bucket / self.total_transitions as f32
    }
}

// ─── Destination-state variant ──────────────────────────────────────

/// Counts how often each destination state is entered, ignoring sources.
///
/// The row estimate is the average transition probability into each state,
/// i.e. a popularity measure.
#[derive(Debug, Clone, Default)]
pub struct DestinationStateAccumulator {
    counters: Vec<f32>,
    total_transitions: usize,
}

impl DestinationStateAccumulator {
    fn add_state(&mut self) {
        self.counters.push(0.0);
        // Registering a state also bumps the transition total. This keeps
        // the row estimate finite on a chain that has not yet observed a
        // single transition, and damps the earliest estimates.
        self.total_transitions += 1;
    }

    fn accumulate_transition(&mut self, to: usize) {
        assert!(to < self.counters.len());

        self.counters[to] += 1.0;
    }

    fn estimate_row(&self, out: &mut Vector) {
        assert_eq!(out.len(), self.counters.len());

        out.copy_from_slice(&self.counters);
        out.scale(1.0 / self.total_transitions as f32);
    }

    /// Raw destination counter, not divided by the transition total.
    fn pair_estimate(&self, to: usize) -> f32 {
        assert!(to < self.counters.len());

        self.counters[to]
    }
}

// ─── Dispatch ───────────────────────────────────────────────────────

/// A fallback statistics accumulator of one of the two supported kinds.
#[derive(Debug, Clone)]
pub enum StatsAccumulator {
    TransitionLength(TransitionLengthAccumulator),
    DestinationState(DestinationStateAccumulator),
}

impl StatsAccumulator {
    /// Construct an empty accumulator of the given kind.
    pub fn new(kind: AccumulatorKind) -> Self {
        match kind {
            AccumulatorKind::TransitionLength => {
                StatsAccumulator::TransitionLength(TransitionLengthAccumulator::default())
            }
            AccumulatorKind::DestinationState => {
                StatsAccumulator::DestinationState(DestinationStateAccumulator::default())
            }
        }
    }

    /// Extend internal storage to accommodate one more state.
    pub fn add_state(&mut self) {
        match self {
            StatsAccumulator::TransitionLength(a) => a.add_state(),
            StatsAccumulator::DestinationState(a) => a.add_state(),
        }
    }

    /// Record one observed transition.
    pub fn accumulate_transition(&mut self, from: usize, to: usize) {
        match self {
            StatsAccumulator::TransitionLength(a) => a.accumulate_transition(from, to),
            StatsAccumulator::DestinationState(a) => a.accumulate_transition(to),
        }
    }

    /// Fill `out` with an unnormalized probability row for transitions out
    /// of `state`. `out` must have one element per registered state.
    pub fn estimate_row(&self, state: usize, out: &mut Vector) {
        match self {
            StatsAccumulator::TransitionLength(a) => a.estimate_row(state, out),
            StatsAccumulator::DestinationState(a) => a.estimate_row(out),
        }
    }

    /// Unnormalized estimate for the single transition `from → to`.
    pub fn pair_estimate(&self, from: usize, to: usize) -> f32 {
        match self {
            StatsAccumulator::TransitionLength(a) => a.pair_estimate(from, to),
            StatsAccumulator::DestinationState(a) => a.pair_estimate(to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_states(kind: AccumulatorKind, n: usize) -> StatsAccumulator {
        let mut acc = StatsAccumulator::new(kind);
        for _ in 0..n {
            acc.add_state();
        }
        acc
    }

    #[test]
    fn transition_length_row_layout() {
        let mut acc = with_states(AccumulatorKind::TransitionLength, 4);

        // Two forward transitions of length 1, one of length 2, one
        // backward of length 1, one self transition.
        acc.accumulate_transition(0, 1);
        acc.accumulate_transition(2, 3);
        acc.accumulate_transition(0, 2);
        acc.accumulate_transition(3, 2);
        acc.accumulate_transition(1, 1);

        let mut row = Vector::zeros(4);
        acc.estimate_row(2, &mut row);

        // From state 2: backward length 2 to state 0, backward length 1 to
        // state 1, self at state 2, forward length 1 to state 3.
        assert_eq!(row.as_slice(), &[0.0, 1.0 / 5.0, 1.0 / 5.0, 2.0 / 5.0]);
    }

    #[test]
    fn transition_length_row_at_boundaries() {
        let mut acc = with_states(AccumulatorKind::TransitionLength, 3);
        acc.accumulate_transition(0, 2);
        acc.accumulate_transition(2, 0);
        acc.accumulate_transition(1, 1);

        let mut row = Vector::zeros(3);
        acc.estimate_row(0, &mut row);
        assert_eq!(row.as_slice(), &[1.0 / 3.0, 0.0, 1.0 / 3.0]);

        acc.estimate_row(2, &mut row);
        assert_eq!(row.as_slice(), &[1.0 / 3.0, 0.0, 1.0 / 3.0]);
    }

    #[test]
    fn transition_length_pair_estimate_matches_buckets() {
        let mut acc = with_states(AccumulatorKind::TransitionLength, 3);
        acc.accumulate_transition(0, 1);
        acc.accumulate_transition(0, 1);
        acc.accumulate_transition(1, 0);
        acc.accumulate_transition(2, 2);

        assert_eq!(acc.pair_estimate(1, 2), 2.0 / 4.0); // forward length 1
        assert_eq!(acc.pair_estimate(2, 1), 1.0 / 4.0); // backward length 1
        assert_eq!(acc.pair_estimate(0, 0), 1.0 / 4.0); // self
        assert_eq!(acc.pair_estimate(0, 2), 0.0);
    }

    #[test]
    fn transition_length_fresh_row_is_not_finite() {
        // No transitions accumulated: the 1/0 scaling leaves the row
        // non-finite, which the controller's ordering tolerates.
        let acc = with_states(AccumulatorKind::TransitionLength, 2);
        let mut row = Vector::zeros(2);
        acc.estimate_row(0, &mut row);
        assert!(row.as_slice().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn destination_state_add_state_pre_seeds_total() {
        let mut acc = with_states(AccumulatorKind::DestinationState, 3);

        // Three states registered, zero transitions: the row must already
        // be finite (all zeros over a total of 3).
        let mut row = Vector::zeros(3);
        acc.estimate_row(0, &mut row);
        assert_eq!(row.as_slice(), &[0.0, 0.0, 0.0]);

        acc.accumulate_transition(0, 1);
        acc.accumulate_transition(2, 1);
        acc.estimate_row(0, &mut row);
        assert_eq!(row.as_slice(), &[0.0, 2.0 / 3.0, 0.0]);
    }

    #[test]
    fn destination_state_ignores_source() {
        let mut acc = with_states(AccumulatorKind::DestinationState, 3);
        acc.accumulate_transition(0, 2);
        acc.accumulate_transition(1, 2);

        let mut from_zero = Vector::zeros(3);
        let mut from_two = Vector::zeros(3);
        acc.estimate_row(0, &mut from_zero);
        acc.estimate_row(2, &mut from_two);

        assert_eq!(from_zero.as_slice(), from_two.as_slice());
    }

    #[test]
    fn destination_state_pair_estimate_is_raw_counter() {
        let mut acc = with_states(AccumulatorKind::DestinationState, 2);
        acc.accumulate_transition(0, 1);
        acc.accumulate_transition(0, 1);
        acc.accumulate_transition(1, 1);

        // Unlike the row estimate, the scalar lookup is not scaled by the
        // transition total.
        assert_eq!(acc.pair_estimate(0, 1), 3.0);
        assert_eq!(acc.pair_estimate(0, 0), 0.0);
    }
}
