//! Cache controller.
//!
//! Translates SET/GET/FLUSH requests into chain updates and eviction
//! decisions. Registered keys are partitioned into a resident map (counted
//! against capacity) and a non-resident map; under admission pressure the
//! controller forecasts near-term re-access probabilities with the chain,
//! weights them by item size, and moves the cheapest candidates out.
//!
//! All operations are synchronous; the controller owns its state exclusively
//! and must not be shared across threads.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::chain::EvolvingMarkovChain;
use crate::error::CacheError;
use crate::linalg::Vector;
use crate::types::CacheConfig;

/// Admission/eviction sink.
///
/// Both callbacks fire after the controller's own bookkeeping has been
/// updated, so a delegate observes the post-decision state.
pub trait CacheDelegate<K> {
    /// `key` has just become resident.
    fn admit_item(&self, key: &K);

    /// `key` has just been moved to the non-resident side.
    fn evict_item(&self, key: &K);
}

/// Variable-size object cache with Markov-chain forecast eviction.
///
/// Keys are stored by value and assigned a dense state index on first SET;
/// the key ↔ state bijection is stable for the controller's lifetime and
/// state indices are never reclaimed, so memory grows as Θ(N²) in the number
/// of distinct keys.
pub struct MarkovCache<K> {
    cfg: CacheConfig,

    resident: HashMap<K, f32>,
    non_resident: HashMap<K, f32>,

    chain: EvolvingMarkovChain,

    current_resident_size: f32,

    /// Sizes indexed by state, kept dense so the cost vector can be weighted
    /// elementwise without copying. The residency maps are only used for
    /// O(1) membership.
    item_sizes: Vec<f32>,

    key_to_state: HashMap<K, usize>,
    state_to_key: Vec<K>,

    delegate: Option<Box<dyn CacheDelegate<K>>>,

    /// State of the most recent access, the forecasting origin for SET.
    prev_state: Option<usize>,
}

impl<K: Eq + Hash + Clone> MarkovCache<K> {
    /// Construct a controller with no delegate.
    pub fn new(cfg: CacheConfig) -> Result<Self, CacheError> {
        Self::build(cfg, None)
    }

    /// Construct a controller that notifies `delegate` on every admission
    /// and eviction.
    pub fn with_delegate(
        cfg: CacheConfig,
        delegate: Box<dyn CacheDelegate<K>>,
    ) -> Result<Self, CacheError> {
        Self::build(cfg, Some(delegate))
    }

    fn build(
        cfg: CacheConfig,
        delegate: Option<Box<dyn CacheDelegate<K>>>,
    ) -> Result<Self, CacheError> {
        cfg.validate()?;

        Ok(Self {
            chain: EvolvingMarkovChain::new(cfg.accumulator, cfg.accesses_threshold),
            cfg,
            resident: HashMap::new(),
            non_resident: HashMap::new(),
            current_resident_size: 0.0,
            item_sizes: Vec::new(),
            key_to_state: HashMap::new(),
            state_to_key: Vec::new(),
            delegate,
            prev_state: None,
        })
    }

    /// Register a never-seen key of the given size and decide its initial
    /// residency.
    ///
    /// Requires `0 < item_size ≤ cache_capacity` and that `key` has not been
    /// registered before. If admitting the item would overflow capacity, the
    /// controller forecasts from the previously accessed state, ranks all
    /// states by cost, and either evicts enough cheaper residents or routes
    /// the new item straight to the non-resident side (never-admit). SET is
    /// a load, not an access: it registers no transition.
    pub fn process_set_request(&mut self, key: K, item_size: f32) {
        assert!(item_size > 0.0);
        assert!(item_size <= self.cfg.cache_capacity);

        let new_state = self.add_new_state(key.clone(), item_size);

        let space_to_free = (self.current_resident_size + item_size) - self.cfg.cache_capacity;

        if space_to_free > 0.0 {
            let num_states = self.chain.num_states();
            let current = self.prev_state.unwrap_or(0);

            let mut costs = self.forecast_costs(current);

            if self.cfg.forecast_length == 1 {
                // The count row has a zero in the freshly added column, but
                // prior belief may still warrant keeping the item resident;
                // patch that one cell from the accumulator.
                costs[num_states - 1] = self
                    .chain
                    .accumulator_transition_probability(current, num_states - 1);
            }

            costs.mul_elements(&self.item_sizes);

            let order = candidate_order(&costs, Some(new_state));

            // Walk the candidates cheapest-first, summing resident bytes up
            // to and including the new state's position. If everything at
            // least as cheap as the new item cannot cover the shortfall,
            // evicting for it is pointless: route it to the non-resident
            // side instead.
            let mut cheaper_resident_bytes = 0.0f32;
            for &s in &order {
                if let Some(size) = self.resident.get(&self.state_to_key[s]) {
                    cheaper_resident_bytes += size;
                }
                if s == new_state {
                    break;
                }
            }

            if cheaper_resident_bytes <= space_to_free {
                debug!(
                    state = new_state,
                    size = item_size,
                    "never-admit: new item goes to the non-resident side"
                );
                self.non_resident.insert(key, item_size);
                return;
            }

            self.evict(space_to_free, &order);
        }

        if let Some(delegate) = &self.delegate {
            delegate.admit_item(&key);
        }
        debug!(state = new_state, size = item_size, "admitted new item");

        self.resident.insert(key, item_size);
        self.current_resident_size += item_size;
    }

    /// Look up a registered key, returning `true` on a hit.
    ///
    /// A miss re-admits the item, evicting under pressure with the
    /// requested key's own state as the forecasting origin. Both outcomes
    /// register a transition from the previously accessed state.
    pub fn process_get_request(&mut self, key: &K) -> bool {
        assert!(
            self.key_to_state.contains_key(key),
            "GET of an unregistered key"
        );

        if self.resident.contains_key(key) {
            self.update_transition_stats(key);
            return true;
        }

        let item_size = self.non_resident[key];
        let space_to_free = (self.current_resident_size + item_size) - self.cfg.cache_capacity;

        if space_to_free > 0.0 {
            let current = self.key_to_state[key];

            let mut costs = self.forecast_costs(current);
            costs.mul_elements(&self.item_sizes);

            let order = candidate_order(&costs, None);
            self.evict(space_to_free, &order);
        }

        self.non_resident.remove(key);

        if let Some(delegate) = &self.delegate {
            delegate.admit_item(key);
        }
        debug!(
            state = self.key_to_state[key],
            size = item_size,
            "admitted item after miss"
        );

        self.resident.insert(key.clone(), item_size);
        self.current_resident_size += item_size;
        self.update_transition_stats(key);

        false
    }

    /// Move every resident entry to the non-resident side.
    ///
    /// No transitions are registered and the delegate is not notified; this
    /// exists so a harness can pre-register a whole key population cheaply
    /// before measurement begins.
    pub fn flush(&mut self) {
        self.non_resident.extend(self.resident.drain());
        self.current_resident_size = 0.0;
    }

    /// Total size of resident items.
    pub fn resident_size(&self) -> f32 {
        self.current_resident_size
    }

    /// Whether `key` is currently resident.
    pub fn is_resident(&self, key: &K) -> bool {
        self.resident.contains_key(key)
    }

    /// Whether `key` is currently on the non-resident side.
    pub fn is_non_resident(&self, key: &K) -> bool {
        self.non_resident.contains_key(key)
    }

    /// Whether `key` has ever been registered via SET.
    pub fn is_registered(&self, key: &K) -> bool {
        self.key_to_state.contains_key(key)
    }

    /// State index assigned to `key`, if registered.
    pub fn state_of(&self, key: &K) -> Option<usize> {
        self.key_to_state.get(key).copied()
    }

    /// Number of registered keys.
    pub fn num_items(&self) -> usize {
        self.state_to_key.len()
    }

    /// Read-only view of the underlying chain.
    pub fn chain(&self) -> &EvolvingMarkovChain {
        &self.chain
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.cfg
    }

    /// Sum `forecast_length` single-step predictions from `current` into an
    /// unnormalized cost vector.
    fn forecast_costs(&mut self, current: usize) -> Vector {
        let num_states = self.chain.num_states();
        let mut costs = Vector::zeros(num_states);

        if self.cfg.forecast_length == 1 {
            self.chain.predict_from_state(current, &mut costs);
        } else {
            let mut state = Vector::zeros(num_states);
            state[current] = 1.0;

            // Summed probability mass over the horizon, read as the
            // cumulative cost of evicting each item by mistake.
            for _ in 0..self.cfg.forecast_length {
                state = self.chain.predict_distribution(&state);
                costs.add_elements(&state);
            }
        }

        costs
    }

    fn add_new_state(&mut self, key: K, size: f32) -> usize {
        assert!(
            !self.key_to_state.contains_key(&key),
            "key is already registered"
        );
        assert!(size > 0.0);

        let state = self.chain.add_state();
        self.key_to_state.insert(key.clone(), state);
        self.state_to_key.push(key);
        self.item_sizes.push(size);
        state
    }

    /// Free at least `space_to_free` bytes by walking `order` and moving
    /// resident entries to the non-resident side.
    fn evict(&mut self, space_to_free: f32, order: &[usize]) {
        assert!(space_to_free > 0.0);
        assert!(space_to_free <= self.cfg.cache_capacity);

        let mut freed = 0.0f32;

        for &s in order {
            let candidate = &self.state_to_key[s];

            if !self.resident.contains_key(candidate) {
                continue;
            }

            let size = self.item_sizes[s];
            self.non_resident.insert(candidate.clone(), size);
            freed += size;

            if let Some(delegate) = &self.delegate {
                delegate.evict_item(candidate);
            }
            debug!(state = s, size, "evicted item to the non-resident side");

            self.resident.remove(candidate);

            if freed >= space_to_free {
                break;
            }
        }

        self.current_resident_size -= freed;
    }

    /// Register the transition from the previously accessed state into
    /// `key`'s state.
    ///
    /// The very first access has no predecessor and is recorded as a
    /// transition out of state 0; the seed biases early forecasts toward
    /// state 0 and washes out with volume.
    fn update_transition_stats(&mut self, key: &K) {
        let state = self.key_to_state[key];

        self.chain
            .register_transition(self.prev_state.unwrap_or(0), state);
        self.prev_state = Some(state);
    }
}

/// Candidate states ordered by ascending cost.
///
/// The sort is stable; costs that compare equal keep their index order,
/// except that `prefer_first` (the just-registered state on SET) sorts ahead
/// of any state with an equal cost. Incomparable costs — the all-NaN rows a
/// fresh transition-length accumulator produces — take no tie-break and
/// also keep their index order.
fn candidate_order(costs: &Vector, prefer_first: Option<usize>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..costs.len()).collect();

    order.sort_by(|&i, &j| match costs[i].partial_cmp(&costs[j]) {
        Some(Ordering::Equal) => match prefer_first {
            Some(s) if i == s => Ordering::Less,
            Some(s) if j == s => Ordering::Greater,
            _ => Ordering::Equal,
        },
        Some(ord) => ord,
        None => Ordering::Equal,
    });

    order
}
