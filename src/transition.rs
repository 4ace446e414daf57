//! Per-task transition/reward synthesis: component-wise Cartesian product enumeration in FSA
//! topological order, with fictitious-state routing for insufficiently explored parents.
//!
//! Ported from `original_source/task.cpp::FindNextStates` / `ComputeOrderFSA`, but enumerated
//! by recursion over the ordered component list rather than a flat multi-counter with carry —
//! see `DESIGN.md` for why the original's counter approach can desynchronize under FSA.

use tracing::{debug, trace};

use crate::cdtb::{self, CdtbCell};
use crate::codec;
use crate::component::Component;
use crate::error::CdtbError;
use crate::task::Task;

/// Computes the FSA topological order: the task's used components sorted by `|in_task|`
/// descending, ties broken by ascending global component index.
pub fn component_order(components_used: &[usize], components: &[Component]) -> Vec<usize> {
	let num_tasks: usize = components.first().map_or(0, |c| c.in_task.len());
	debug_assert!(
		components.iter().all(|c| c.in_task.len() == num_tasks),
		"every component must carry an in_task mask of the same length (the task count), \
		 since the outer bound below is taken from a single component's mask"
	);
	let mut order: Vec<usize> = Vec::with_capacity(components_used.len());
	for size in (1..=num_tasks).rev() {
		for &k in components_used {
			if components[k].order() == size {
				order.push(k);
			}
		}
	}
	order
}

/// Rebuilds `task.transition[s][a]` and `task.reward[s][a]` for every real state `s` and local
/// action `a`, then sets the fictitious state's self-absorbing row. Used for both FSA and
/// non-FSA mode; the only difference between the two is which codec function each component's
/// parent index is computed with, selected internally per §4.5.
#[tracing::instrument(skip(task, cdtb, components))]
pub fn construct_transition_function(
	task: &mut Task,
	cdtb: &[Vec<CdtbCell>],
	components: &[Component],
	fsa_mode: bool,
	exploration_threshold: u64,
) -> Result<(), CdtbError> {
	let order: Vec<usize> = component_order(&task.components_used, components);

	for s in 0..task.state_size {
		for a in 0..task.total_actions {
			find_next_states(task, cdtb, components, &order, fsa_mode, exploration_threshold, s, a)?;
		}
	}

	let fictitious: usize = task.state_size;
	for a in 0..task.total_actions {
		task.transition[fictitious][a] = vec![(fictitious, 1.0)];
		task.reward[fictitious][a] = task.rmax as f64;
	}

	Ok(())
}

/// Synthesizes `transition[state][local_action]`, routing to the fictitious state if any
/// component along the way is insufficiently explored.
#[tracing::instrument(skip(task, cdtb, components, order))]
fn find_next_states(
	task: &mut Task,
	cdtb: &[Vec<CdtbCell>],
	components: &[Component],
	order: &[usize],
	fsa_mode: bool,
	exploration_threshold: u64,
	state: usize,
	local_action: usize,
) -> Result<(), CdtbError> {
	let current_state: Vec<i32> = codec::decode(state, &task.feature_size, &task.features);
	let global_action: usize = task.local_to_global_action(local_action)?;

	let mut next_state: Vec<i32> = vec![codec::UNSET; task.feature_size.len()];
	let mut acc: Vec<(usize, f64)> = Vec::new();

	let outcome = enumerate(
		cdtb,
		components,
		order,
		0,
		&current_state,
		&mut next_state,
		&task.feature_size,
		&task.features,
		global_action,
		fsa_mode,
		exploration_threshold,
		1.0,
		&mut acc,
	)?;

	match outcome {
		Outcome::Fictitious => {
			trace!(state, local_action, "routed to fictitious state");
			task.transition[state][local_action] = vec![(task.state_size, 1.0)];
			task.reward[state][local_action] = task.rmax as f64;
		},
		Outcome::Enumerated => {
			debug!(state, local_action, outcomes = acc.len(), "transition row built");
			task.transition[state][local_action] = acc;
		},
	}

	Ok(())
}

enum Outcome {
	Fictitious,
	Enumerated,
}

#[allow(clippy::too_many_arguments)]
fn enumerate(
	cdtb: &[Vec<CdtbCell>],
	components: &[Component],
	order: &[usize],
	idx: usize,
	current_state: &[i32],
	next_state: &mut [i32],
	size: &[u32],
	task_features: &[bool],
	global_action: usize,
	fsa_mode: bool,
	exploration_threshold: u64,
	running_probability: f64,
	acc: &mut Vec<(usize, f64)>,
) -> Result<Outcome, CdtbError> {
	if idx == order.len() {
		let flat: usize = codec::encode(next_state, size, task_features)?;
		acc.push((flat, running_probability));
		return Ok(Outcome::Enumerated);
	}

	let k: usize = order[idx];
	let cell: &CdtbCell = &cdtb[k][global_action];

	let parent: usize = if fsa_mode {
		codec::encode_parent_fsa(current_state, next_state, size, &cell.parent_features)?
	} else {
		codec::encode(current_state, size, &cell.parent_features)?
	};

	if cell.exploration_count[parent] < exploration_threshold {
		return Ok(Outcome::Fictitious);
	}

	let row = cdtb::distribution_row(cell, k, global_action, parent)?.to_vec();

	for (child_value, probability) in row {
		let component_value: Vec<i32> = codec::decode(child_value, size, &components[k].features);
		for (j, &in_component) in components[k].features.iter().enumerate() {
			if in_component {
				next_state[j] = component_value[j];
			}
		}

		match enumerate(
			cdtb,
			components,
			order,
			idx + 1,
			current_state,
			next_state,
			size,
			task_features,
			global_action,
			fsa_mode,
			exploration_threshold,
			running_probability * probability,
			acc,
		)? {
			Outcome::Fictitious => return Ok(Outcome::Fictitious),
			Outcome::Enumerated => {},
		}
	}

	Ok(Outcome::Enumerated)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::component::derive_components;
	use crate::config::Config;

	// Scenario C (spec §8): with exploration_threshold set above the number of observations a
	// parent row has actually seen, construct_transition_function must abandon enumeration for
	// every (s, a) that touches that row and route it to the fictitious state instead.
	#[test]
	fn scenario_c_insufficient_exploration_routes_to_fictitious() {
		crate::test_support::init_tracing();

		let config = Config::new(vec![2], 1, 5);
		let task_features = vec![vec![true]];
		let task_actions = vec![vec![true]];
		let components = derive_components(1, &task_features);
		let mut cdtb = cdtb::generate_cdtb(
			&components,
			&task_features,
			&task_actions,
			&config.feature_size,
			config.total_actions as usize,
			config.fsa_mode,
		);
		let mut task = Task::new("t0", task_features[0].clone(), task_actions[0].clone(), &config, &components);

		// Only 3 observations of parent 0, short of the exploration_threshold of 5.
		let k = task.components_used[0];
		let cell = &mut cdtb[k][0];
		for child in [0usize, 1, 0] {
			let parent = codec::encode(&[0], &config.feature_size, &cell.parent_features).unwrap();
			cdtb::update_with_experience(cell, parent, child);
		}

		construct_transition_function(&mut task, &cdtb, &components, config.fsa_mode, config.exploration_threshold as u64).unwrap();

		for s in 0..task.state_size {
			assert_eq!(task.transition[s][0], vec![(task.state_size, 1.0)]);
			assert_eq!(task.reward[s][0], config.rmax as f64);
		}
	}

	#[test]
	fn order_is_descending_by_size_ties_ascending_index() {
		// Component 0 shared by 1 task, component 1 shared by 2 tasks.
		let components = vec![
			Component { in_task: vec![true, false], features: vec![true, false] },
			Component { in_task: vec![true, true], features: vec![false, true] },
		];
		let order = component_order(&[0, 1], &components);
		assert_eq!(order, vec![1, 0]);
	}

	#[test]
	fn order_ties_break_by_ascending_global_index() {
		let components = vec![
			Component { in_task: vec![true], features: vec![true, false, false] },
			Component { in_task: vec![true], features: vec![false, true, false] },
			Component { in_task: vec![true], features: vec![false, false, true] },
		];
		let order = component_order(&[0, 1, 2], &components);
		assert_eq!(order, vec![0, 1, 2]);
	}

	#[test]
	fn order_ignores_unused_components() {
		let task_features = vec![vec![true, true], vec![false, true]];
		let components = derive_components(2, &task_features);
		let f1_owner = components.iter().position(|c| c.features == vec![false, true]).unwrap();
		let order = component_order(&[f1_owner], &components);
		assert_eq!(order, vec![f1_owner]);
	}
}
