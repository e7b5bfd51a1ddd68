//! Evolving Markov chain over the access sequence.
//!
//! The chain owns the raw transition-count matrix, per-source access
//! counters, a lazily materialized stochastic matrix, and one fallback
//! accumulator. Per row it arbitrates between direct counts and the
//! accumulator estimate based on the access threshold: rows with fewer than
//! `accesses_threshold` outgoing observations are considered too sparse to
//! predict from directly.

use tracing::trace;

use crate::accumulator::StatsAccumulator;
use crate::linalg::{Matrix, Resize, Vector};
use crate::types::AccumulatorKind;

/// First-order Markov chain that grows online as states are registered.
#[derive(Debug, Clone)]
pub struct EvolvingMarkovChain {
    num_states: usize,
    /// `transition_counts[(i, j)]` is the number of observed `i → j`
    /// transitions.
    transition_counts: Matrix,
    /// Outgoing-transition totals per source state; always equals the row
    /// sum of `transition_counts`.
    access_counters: Vec<usize>,
    /// Row-normalized view of the counts, with sparse rows replaced by the
    /// scaled accumulator estimate. Rebuilt on demand.
    stochastic: Matrix,
    stochastic_stale: bool,
    accesses_threshold: usize,
    accumulator: StatsAccumulator,
}

impl EvolvingMarkovChain {
    /// Create an empty chain with the given fallback accumulator variant.
    pub fn new(kind: AccumulatorKind, accesses_threshold: usize) -> Self {
        Self {
            num_states: 0,
            transition_counts: Matrix::default(),
            access_counters: Vec::new(),
            stochastic: Matrix::default(),
            stochastic_stale: true,
            accesses_threshold,
            accumulator: StatsAccumulator::new(kind),
        }
    }

    /// Number of registered states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Outgoing-transition count for `state`.
    pub fn access_counter(&self, state: usize) -> usize {
        self.access_counters[state]
    }

    /// Read-only view of the raw transition counts.
    pub fn transition_counts(&self) -> &Matrix {
        &self.transition_counts
    }

    /// Register a new state and return its index.
    ///
    /// Grows the count matrix by one row and one column (existing counts are
    /// preserved), extends the access counters and the accumulator, and
    /// invalidates the stochastic view.
    pub fn add_state(&mut self) -> usize {
        self.num_states += 1;

        self.transition_counts
            .resize(self.num_states, self.num_states, Resize::Copy);
        self.access_counters.push(0);
        self.stochastic_stale = true;

        self.accumulator.add_state();

        self.num_states - 1
    }

    /// Record one observed transition `from → to`.
    pub fn register_transition(&mut self, from: usize, to: usize) {
        assert!(from < self.num_states);
        assert!(to < self.num_states);

        self.transition_counts[(from, to)] += 1.0;
        self.access_counters[from] += 1;
        self.stochastic_stale = true;

        self.accumulator.accumulate_transition(from, to);

        trace!(from, to, "registered transition");
    }

    /// Single-step prediction out of `current`, written into `out`.
    ///
    /// Fills `out` with the accumulator row estimate when the source row is
    /// below the access threshold, otherwise copies the raw count row. The
    /// result is an unnormalized relative signal, not a distribution.
    pub fn predict_from_state(&self, current: usize, out: &mut Vector) {
        assert!(current < self.num_states);
        assert_eq!(out.len(), self.num_states);

        if self.access_counters[current] < self.accesses_threshold {
            self.accumulator.estimate_row(current, out);
        } else {
            out.copy_from_slice(self.transition_counts.row(current));
        }
    }

    /// Propagate a state distribution one step forward: `Pᵀ · state`.
    ///
    /// Refreshes the stochastic matrix if stale. Callers sum repeated
    /// applications to forecast over a horizon.
    pub fn predict_distribution(&mut self, state: &Vector) -> Vector {
        assert_eq!(state.len(), self.num_states);

        self.refresh_stochastic();

        let mut next = Vector::zeros(self.num_states);
        self.stochastic
            .trans_mat_mul_vec(state.as_slice(), next.as_mut_slice());
        next
    }

    /// Unnormalized accumulator estimate for the single transition
    /// `from → to`.
    pub fn accumulator_transition_probability(&self, from: usize, to: usize) -> f32 {
        assert!(from < self.num_states);
        assert!(to < self.num_states);

        self.accumulator.pair_estimate(from, to)
    }

    /// Refresh and return the row-stochastic view of the chain.
    ///
    /// Every returned row sums to 1 provided it had at least one positive
    /// count or a positive accumulator estimate.
    pub fn stochastic_matrix(&mut self) -> &Matrix {
        self.refresh_stochastic();
        &self.stochastic
    }

    fn refresh_stochastic(&mut self) {
        // Predictions between mutations reuse the previous materialization.
        if !self.stochastic_stale {
            return;
        }

        self.stochastic
            .resize(self.num_states, self.num_states, Resize::Zeros);

        for i in 0..self.num_states {
            if self.access_counters[i] < self.accesses_threshold {
                let mut row = Vector::zeros(self.num_states);
                self.accumulator.estimate_row(i, &mut row);
                row.scale(1.0 / row.sum());
                self.stochastic.row_mut(i).copy_from_slice(row.as_slice());
            } else {
                let counts = self.transition_counts.row(i);
                let scale = 1.0 / self.access_counters[i] as f32;
                for (dst, &c) in self.stochastic.row_mut(i).iter_mut().zip(counts) {
                    *dst = c * scale;
                }
            }
        }

        self.stochastic_stale = false;
    }
}
