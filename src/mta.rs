//! The registry container: owns all tasks, the component partition, and the CDTB. Ported from
//! `original_source/mta.h`/`mta.cpp`'s `MTA` base class, made concrete rather than abstract —
//! `UpdateWithNewObservation` was a pure-virtual hook for the application in the original; here
//! it is a single dispatch implementation shared by every task (§4.4).

use tracing::{debug, instrument};

use crate::cdtb::{self, CdtbCell};
use crate::codec;
use crate::component::{self, Component};
use crate::config::Config;
use crate::error::MtaError;
use crate::task::Task;

/// Owns the component registry, the CDTB, and every registered task for the lifetime of a
/// learning run.
#[derive(Debug)]
pub struct Mta {
	config: Config,
	pending: Vec<(String, Vec<bool>, Vec<bool>)>,
	components: Vec<Component>,
	cdtb: Vec<Vec<CdtbCell>>,
	tasks: Vec<Task>,
	built: bool,
}

impl Mta {
	/// Validates `config` and starts an empty registry. Call [`Self::register_task`] for every
	/// task, then [`Self::build`] once before any observation or action call.
	pub fn new(config: Config) -> Result<Self, crate::error::ConfigError> {
		config.validate()?;
		Ok(Self { config, pending: Vec::new(), components: Vec::new(), cdtb: Vec::new(), tasks: Vec::new(), built: false })
	}

	/// Queues a task for registration. Has no effect on the component/CDTB derivation until
	/// [`Self::build`] runs.
	#[instrument(skip(self, features, actions))]
	pub fn register_task(&mut self, name: impl Into<String>, features: Vec<bool>, actions: Vec<bool>) {
		self.pending.push((name.into(), features, actions));
	}

	/// Derives the component partition and CDTB from every registered task's feature/action
	/// masks, then builds each [`Task`]. Idempotent: later calls are a no-op.
	#[instrument(skip(self))]
	pub fn build(&mut self) {
		if self.built {
			return;
		}

		let task_features: Vec<Vec<bool>> = self.pending.iter().map(|(_, f, _)| f.clone()).collect();
		let task_actions: Vec<Vec<bool>> = self.pending.iter().map(|(_, _, a)| a.clone()).collect();

		self.components = component::derive_components(self.config.feature_size.len(), &task_features);
		self.cdtb = cdtb::generate_cdtb(
			&self.components,
			&task_features,
			&task_actions,
			&self.config.feature_size,
			self.config.total_actions as usize,
			self.config.fsa_mode,
		);

		self.tasks =
			self.pending.drain(..).map(|(name, features, actions)| Task::new(name, features, actions, &self.config, &self.components)).collect();

		debug!(tasks = self.tasks.len(), components = self.components.len(), "mta built");
		self.built = true;
	}

	/// Looks up a task by name.
	pub fn task(&self, name: &str) -> Option<&Task> {
		self.tasks.iter().find(|t| t.name == name)
	}

	/// The derived component partition; empty until [`Self::build`] runs.
	pub fn components(&self) -> &[Component] {
		&self.components
	}

	/// The derived CDTB; empty until [`Self::build`] runs.
	pub fn cdtb(&self) -> &[Vec<CdtbCell>] {
		&self.cdtb
	}

	fn task_position(&self, name: &str) -> Result<usize, MtaError> {
		self.tasks.iter().position(|t| t.name == name).ok_or_else(|| MtaError::UnknownTask { name: name.to_owned() })
	}

	/// Folds one observed transition into every CDTB cell the named task uses, per §4.4.
	///
	/// `action` is the global action index; `last_state`/`current_state` are full-length (`F`)
	/// factored state vectors, with every feature the task cares about required to be set.
	#[instrument(skip(self, last_state, current_state))]
	pub fn update_with_new_observation(&mut self, task_name: &str, last_state: &[i32], action: u32, current_state: &[i32]) -> Result<(), MtaError> {
		let idx = self.task_position(task_name)?;
		let task = &self.tasks[idx];
		let global_action: usize = action as usize;

		for &k in &task.components_used {
			let component = &self.components[k];
			let cell = &mut self.cdtb[k][global_action];
			if cell.is_absent() {
				continue;
			}

			let parent: usize = if self.config.fsa_mode {
				codec::encode_parent_fsa(last_state, current_state, &self.config.feature_size, &cell.parent_features)?
			} else {
				codec::encode(last_state, &self.config.feature_size, &cell.parent_features)?
			};
			let child: usize = codec::encode(current_state, &self.config.feature_size, &component.features)?;

			cdtb::update_with_experience(cell, parent, child);
		}

		Ok(())
	}

	/// Selects an action for the named task in `current_state`, per §4.7.
	#[instrument(skip(self, current_state))]
	pub fn select_best_action(&mut self, task_name: &str, current_state: &[i32], speedup: bool) -> Result<u32, MtaError> {
		let idx = self.task_position(task_name)?;
		let action = self.tasks[idx].select_best_action(current_state, speedup, &self.cdtb, &self.components, &self.config)?;
		Ok(action)
	}
}
