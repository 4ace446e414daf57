//! Contextual dependency table: for each `(component, action)` cell, the parent-feature mask,
//! parent-size, visit counts, and sparse conditional distribution over component values.
//! Construction ported from `original_source/mta.cpp::GenerateContextualDependencyTable`;
//! incremental update ported from `original_source/task.cpp::Distribution::UpdateWithNewExperience`.

use tracing::debug;

use crate::component::Component;
use crate::error::CdtbError;

/// One `(component, action)` cell of the contextual dependency table.
#[derive(Debug, Clone)]
pub struct CdtbCell {
	/// Parent-feature mask: length `F` (non-FSA) or `2F` (FSA, previous-step || current-step).
	pub parent_features: Vec<bool>,
	/// Product of `size[j]` over set `parent_features` bits; also `exploration_count.len()`.
	pub parent_size: usize,
	/// Visit count per parent row.
	pub exploration_count: Vec<u64>,
	/// Sparse conditional distribution per parent row: `(child_value, probability)` pairs.
	pub distribution: Vec<Vec<(usize, f64)>>,
	/// Index of the component this cell belongs to.
	pub component: usize,
}

impl CdtbCell {
	fn empty(component: usize, parent_features: Vec<bool>, size: &[u32]) -> Self {
		let parent_size: usize = parent_features
			.iter()
			.zip(size.iter().chain(size.iter()))
			.filter(|(&set, _)| set)
			.map(|(_, &s)| s as usize)
			.product();
		Self {
			parent_features,
			parent_size,
			exploration_count: vec![0; parent_size],
			distribution: vec![Vec::new(); parent_size],
			component,
		}
	}

	/// Whether this cell is structurally absent: no task has both the relevant action and the
	/// component (§4.3 step 2). An absent cell has an all-false parent mask and `parent_size`
	/// of `1` (the empty product), never populated by an observation.
	pub fn is_absent(&self) -> bool {
		self.parent_features.iter().all(|&b| !b)
	}
}

/// Builds the full CDTB: one row per component, `total_actions + 1` columns (the last column
/// is the no-op cell used only for structural bookkeeping, see §4.3).
#[tracing::instrument(skip(components, task_features, task_actions, size))]
pub fn generate_cdtb(
	components: &[Component],
	task_features: &[Vec<bool>],
	task_actions: &[Vec<bool>],
	size: &[u32],
	total_actions: usize,
	fsa_mode: bool,
) -> Vec<Vec<CdtbCell>> {
	let num_features: usize = size.len();

	components
		.iter()
		.enumerate()
		.map(|(k, component)| {
			let mut row: Vec<CdtbCell> = Vec::with_capacity(total_actions + 1);

			for a in 0..total_actions {
				let intersection: Vec<bool> = (0..task_features.len())
					.map(|i| task_actions[i][a] && component.in_task[i])
					.collect();

				if !intersection.iter().any(|&b| b) {
					// Assumption 2: action `a` does not affect component `k`; leave empty.
					row.push(CdtbCell::empty(k, vec![false; if fsa_mode { 2 * num_features } else { num_features }], size));
					continue;
				}

				let mut parent_features: Vec<bool> = vec![false; if fsa_mode { 2 * num_features } else { num_features }];
				for j in 0..num_features {
					let feature_used: bool = (0..task_features.len())
						.filter(|&i| intersection[i])
						.all(|i| task_features[i][j]);
					if !feature_used {
						continue;
					}
					parent_features[j] = true;

					if fsa_mode {
						let owner: usize = components.iter().position(|c| c.features[j]).expect("every feature belongs to a component");
						if is_strict_subset(&component.in_task, &components[owner].in_task) {
							parent_features[num_features + j] = true;
						}
					}
				}

				debug!(component = k, action = a, ?parent_features, "cdtb cell sized");
				row.push(CdtbCell::empty(k, parent_features, size));
			}

			// No-op column: parent_features = the component's own features, no current-step bits.
			let mut noop_parent: Vec<bool> = vec![false; if fsa_mode { 2 * num_features } else { num_features }];
			noop_parent[..num_features].copy_from_slice(&component.features);
			row.push(CdtbCell::empty(k, noop_parent, size));

			row
		})
		.collect()
}

fn is_strict_subset(first: &[bool], second: &[bool]) -> bool {
	let mut strict_larger: bool = false;
	for (&f, &s) in first.iter().zip(second.iter()) {
		if f && !s {
			return false;
		}
		if !f && s {
			strict_larger = true;
		}
	}
	strict_larger
}

/// Incrementally folds one observation into `cell.distribution[parent]`, per §4.4.
#[tracing::instrument(skip(cell))]
pub fn update_with_experience(cell: &mut CdtbCell, parent: usize, child: usize) {
	let n: u64 = cell.exploration_count[parent];
	let row = &mut cell.distribution[parent];

	let mut found: bool = false;
	for (value, prob) in row.iter_mut() {
		if *value == child {
			*prob = (*prob * n as f64 + 1.0) / (n as f64 + 1.0);
			found = true;
		} else {
			*prob *= n as f64 / (n as f64 + 1.0);
		}
	}
	if !found {
		row.push((child, 1.0 / (n as f64 + 1.0)));
	}
	cell.exploration_count[parent] += 1;
	debug!(parent, child, n = n + 1, "distribution row updated");
}

/// Sum of probabilities in a (populated) parent row; used by tests and by callers wanting to
/// assert the normalization invariant.
pub fn row_mass(cell: &CdtbCell, parent: usize) -> f64 {
	cell.distribution[parent].iter().map(|(_, p)| p).sum()
}

/// Fetches `(child, probability)` pairs for a sufficiently explored parent row, or
/// [`CdtbError::EmptyDistribution`] if the row is unexpectedly empty despite having met the
/// exploration threshold (a logic-bug signal, never a normal runtime condition).
pub fn distribution_row<'a>(
	cell: &'a CdtbCell,
	component: usize,
	action: usize,
	parent: usize,
) -> Result<&'a [(usize, f64)], CdtbError> {
	let row = &cell.distribution[parent];
	if row.is_empty() {
		return Err(CdtbError::EmptyDistribution { component, action, parent });
	}
	Ok(row)
}
