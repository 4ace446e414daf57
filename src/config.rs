//! Construction-time configuration for an [`crate::mta::Mta`] registry, validated eagerly
//! rather than left to panic deep inside the algorithm.

use crate::error::ConfigError;

/// Tunables shared by every task registered with an [`crate::mta::Mta`].
///
/// Mirrors the free-standing globals read by `original_source/mta.cpp` at startup
/// (`featureSize`, `totalActions`, `M`, `Rmax`, the discount and value-iteration constants), but
/// gathered into one validated struct instead of process-wide state.
#[derive(Debug, Clone)]
pub struct Config {
	/// Domain size of each feature, `size[j] >= 1`.
	pub feature_size: Vec<u32>,
	/// Total number of distinct actions across all tasks.
	pub total_actions: u32,
	/// Minimum visits to a parent row (`M`) before it is trusted over the Rmax fictitious route.
	pub exploration_threshold: u32,
	/// Optimistic reward assigned to unexplored transitions and the fictitious state.
	pub rmax: i64,
	/// Discount factor `gamma` used by value iteration.
	pub discount: f64,
	/// Value-iteration convergence threshold (max-norm Bellman residual).
	pub vi_precision: f64,
	/// Whether the CDTB augments parent sets with current-step (FSA) dependencies.
	pub fsa_mode: bool,
	/// How many `select_best_action` calls between forced full replans when using the speedup
	/// heuristic.
	pub speedup_period: u64,
}

impl Config {
	/// Starts a config with the given feature sizes, total action count, and exploration
	/// threshold; everything else defaults to the values in §4.8.
	pub fn new(feature_size: Vec<u32>, total_actions: u32, exploration_threshold: u32) -> Self {
		Self {
			feature_size,
			total_actions,
			exploration_threshold,
			rmax: 100,
			discount: 0.9,
			vi_precision: 0.1,
			fsa_mode: false,
			speedup_period: 50,
		}
	}

	/// Builder-style setter for [`Self::rmax`].
	pub fn with_rmax(mut self, rmax: i64) -> Self {
		self.rmax = rmax;
		self
	}

	/// Builder-style setter for [`Self::discount`].
	pub fn with_discount(mut self, discount: f64) -> Self {
		self.discount = discount;
		self
	}

	/// Builder-style setter for [`Self::vi_precision`].
	pub fn with_vi_precision(mut self, vi_precision: f64) -> Self {
		self.vi_precision = vi_precision;
		self
	}

	/// Builder-style setter for [`Self::fsa_mode`].
	pub fn with_fsa_mode(mut self, fsa_mode: bool) -> Self {
		self.fsa_mode = fsa_mode;
		self
	}

	/// Builder-style setter for [`Self::speedup_period`].
	pub fn with_speedup_period(mut self, speedup_period: u64) -> Self {
		self.speedup_period = speedup_period;
		self
	}

	/// Validates the configuration, matching §4.8's invariants.
	pub fn validate(&self) -> Result<(), ConfigError> {
		for (index, &size) in self.feature_size.iter().enumerate() {
			if size == 0 {
				return Err(ConfigError::InvalidFeatureSize { index, size });
			}
		}
		if self.total_actions == 0 {
			return Err(ConfigError::NoActions);
		}
		if self.exploration_threshold == 0 {
			return Err(ConfigError::NoExplorationThreshold);
		}
		Ok(())
	}
}
