//! A single task's local state/action space, transition/reward arrays, and planner. Ported
//! from `original_source/task.cpp`'s `Task` class.

use tracing::{debug, trace};

use crate::cdtb::CdtbCell;
use crate::codec;
use crate::component::Component;
use crate::config::Config;
use crate::error::{CdtbError, IndexError};
use crate::planner::Planner;
use crate::transition;
use crate::util;

/// One task's feature/action projection, transition and reward arrays, and warm-started planner.
///
/// `local` indices throughout (local action, local component order) are dense and task-specific;
/// `global` indices are positions in the shared feature/action/component vocabularies. See
/// `DESIGN.md`'s "global/local index duality" note.
#[derive(Debug, Clone)]
pub struct Task {
	/// Task name, used only for diagnostics and driver-side bookkeeping.
	pub name: String,
	/// Global feature mask (length `F`).
	pub features: Vec<bool>,
	/// Global action mask (length `A`).
	pub actions: Vec<bool>,
	/// Shared feature domain sizes (length `F`).
	pub feature_size: Vec<u32>,
	/// Number of real (non-fictitious) local states, `S`.
	pub state_size: usize,
	/// Number of local actions this task has.
	pub total_actions: usize,
	/// Global component indices this task uses, ascending.
	pub components_used: Vec<usize>,
	/// `transition[s][local_a]`: sparse `(s', prob)` pairs, sized `S+1`.
	pub transition: Vec<Vec<Vec<(usize, f64)>>>,
	/// `reward[s][local_a]`, sized `S+1`.
	pub reward: Vec<Vec<f64>>,
	/// `applicable_actions[s][local_a]`, sized `S+1`.
	pub applicable_actions: Vec<Vec<bool>>,
	/// Optimistic reward; also the fictitious state's absorbing reward.
	pub rmax: i64,
	/// Count of full replans actually performed (not incremented by cached/probe returns).
	pub total_steps: u64,
	planner: Planner,
}

impl Task {
	/// Registers a new task given its global feature/action masks. `components` must already be
	/// derived (via [`crate::component::derive_components`]) across all registered tasks.
	pub fn new(name: impl Into<String>, features: Vec<bool>, actions: Vec<bool>, config: &Config, components: &[Component]) -> Self {
		let feature_size = config.feature_size.clone();
		let state_size: usize =
			feature_size.iter().zip(features.iter()).filter(|(_, &relevant)| relevant).map(|(&size, _)| size as usize).product();
		let total_actions: usize = actions.iter().filter(|&&b| b).count();

		let components_used: Vec<usize> = crate::component::used_components(components, &features)
			.iter()
			.enumerate()
			.filter_map(|(k, &used)| used.then_some(k))
			.collect();

		let num_states: usize = state_size + 1;
		let fictitious: usize = state_size;

		let mut transition: Vec<Vec<Vec<(usize, f64)>>> = vec![vec![Vec::new(); total_actions]; num_states];
		let mut reward: Vec<Vec<f64>> = vec![vec![config.rmax as f64; total_actions]; num_states];
		let applicable_actions: Vec<Vec<bool>> = vec![vec![true; total_actions]; num_states];

		for a in 0..total_actions {
			transition[fictitious][a] = vec![(fictitious, 1.0)];
			reward[fictitious][a] = config.rmax as f64;
		}

		let planner = Planner::new(num_states, total_actions, config.discount, config.rmax);

		Self {
			name: name.into(),
			features,
			actions,
			feature_size,
			state_size,
			total_actions,
			components_used,
			transition,
			reward,
			applicable_actions,
			rmax: config.rmax,
			total_steps: 0,
			planner,
		}
	}

	/// Maps a local action index to its global index.
	pub fn local_to_global_action(&self, local: usize) -> Result<usize, IndexError> {
		util::local_to_global(&self.actions, local)
	}

	/// Maps a global action index to this task's local index.
	pub fn global_to_local_action(&self, global: usize) -> Option<usize> {
		util::global_to_local(&self.actions, global).ok()
	}

	/// Rebuilds `transition`/`reward` from the CDTB, per §4.5.
	#[tracing::instrument(skip(self, cdtb, components))]
	pub fn construct_transition_function(&mut self, cdtb: &[Vec<CdtbCell>], components: &[Component], fsa_mode: bool, exploration_threshold: u64) -> Result<(), CdtbError> {
		transition::construct_transition_function(self, cdtb, components, fsa_mode, exploration_threshold)
	}

	/// Chooses an action for `current_state` (a full-length, length-`F` factored state vector).
	///
	/// When `speedup` is set, first probes for an under-explored component/action pair (the
	/// approximate own-feature-mask probe of §4.7) to drive exploration, then falls back to the
	/// cached policy between replans; otherwise always replans.
	#[tracing::instrument(skip(self, cdtb, components, config))]
	pub fn select_best_action(&mut self, current_state: &[i32], speedup: bool, cdtb: &[Vec<CdtbCell>], components: &[Component], config: &Config) -> Result<u32, CdtbError> {
		if speedup {
			for &k in &self.components_used {
				let component = &components[k];
				for local_a in 0..self.total_actions {
					let global_a = self.local_to_global_action(local_a)?;
					let cell = &cdtb[k][global_a];
					let Ok(probe_index) = codec::encode(current_state, &self.feature_size, &component.features) else {
						continue;
					};
					let count = cell.exploration_count.get(probe_index).copied().unwrap_or(0);
					if count < config.exploration_threshold as u64 {
						trace!(component = k, action = global_a, "speedup probe found under-explored pair");
						return Ok(global_a as u32);
					}
				}
			}

			if self.total_steps % config.speedup_period != 0 {
				let flat = codec::encode(current_state, &self.feature_size, &self.features)?;
				let local_a = self.planner.actions[flat];
				return Ok(self.local_to_global_action(local_a)? as u32);
			}
		}

		self.construct_transition_function(cdtb, components, config.fsa_mode, config.exploration_threshold as u64)?;
		self.planner.run(&self.reward, &self.transition, &self.applicable_actions, config.vi_precision);

		let flat = codec::encode(current_state, &self.feature_size, &self.features)?;
		let local_a = self.planner.actions[flat];
		self.total_steps += 1;
		debug!(total_steps = self.total_steps, "replanned");
		Ok(self.local_to_global_action(local_a)? as u32)
	}

	/// Current planner values, indexed by local state (including the fictitious state at `S`).
	pub fn values(&self) -> &[f64] {
		&self.planner.values
	}

	/// Current planner policy, indexed by local state (including the fictitious state at `S`).
	pub fn policy(&self) -> &[usize] {
		&self.planner.actions
	}
}
