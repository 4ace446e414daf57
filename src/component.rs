//! Component registry: derives the partition of features into components from the set of
//! registered tasks' feature masks. Ported from `original_source/mta.cpp::ComputeComponents`.

use tracing::debug;

/// A maximal set of features shared by exactly the same subset of tasks.
///
/// `in_task` uniquely identifies a component: no two components in a registry share the same
/// `in_task` mask.
#[derive(Debug, Clone)]
pub struct Component {
	/// Bit `i` is set iff task `i` has every feature of this component.
	pub in_task: Vec<bool>,
	/// Bit `j` is set iff feature `j` belongs to this component.
	pub features: Vec<bool>,
}

impl Component {
	/// Number of tasks this component is shared by.
	pub fn order(&self) -> usize {
		self.in_task.iter().filter(|&&b| b).count()
	}
}

/// Derives the component partition for a set of tasks' feature masks.
///
/// `task_features[i]` is task `i`'s feature mask (length `F`). Returns one [`Component`] per
/// distinct `in_task` mask observed across the `F` features.
#[tracing::instrument(skip(task_features))]
pub fn derive_components(num_features: usize, task_features: &[Vec<bool>]) -> Vec<Component> {
	let num_tasks: usize = task_features.len();
	let mut components: Vec<Component> = Vec::new();

	for j in 0..num_features {
		let in_task: Vec<bool> = (0..num_tasks).map(|i| task_features[i][j]).collect();

		let existing = components.iter_mut().find(|c| c.in_task == in_task);
		match existing {
			Some(component) => {
				component.features[j] = true;
			},
			None => {
				debug!(feature = j, ?in_task, "new component");
				let mut features: Vec<bool> = vec![false; num_features];
				features[j] = true;
				components.push(Component { in_task, features });
			},
		}
	}

	components
}

/// For each task, which components it uses: bit `k` is set iff every feature of component `k`
/// lies within the task's feature mask.
#[tracing::instrument(skip(components, task_features))]
pub fn used_components(components: &[Component], task_features: &[bool]) -> Vec<bool> {
	components
		.iter()
		.map(|component| {
			component
				.features
				.iter()
				.enumerate()
				.all(|(j, &in_component)| !in_component || task_features[j])
		})
		.collect()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn scenario_a_two_independent_features() {
		// F=2, Task1 features=[1,0], Task2 features=[0,1].
		let task_features = vec![vec![true, false], vec![false, true]];
		let components = derive_components(2, &task_features);
		assert_eq!(components.len(), 2);
		assert_eq!(components[0].in_task, vec![true, false]);
		assert_eq!(components[0].features, vec![true, false]);
		assert_eq!(components[1].in_task, vec![false, true]);
		assert_eq!(components[1].features, vec![false, true]);
	}

	#[test]
	fn scenario_b_shared_feature() {
		// F=2, Task1 features=[1,1], Task2 features=[0,1].
		let task_features = vec![vec![true, true], vec![false, true]];
		let components = derive_components(2, &task_features);
		assert_eq!(components.len(), 2);
		// f0 -> in_task [true, false]
		assert!(components.iter().any(|c| c.in_task == vec![true, false] && c.features == vec![true, false]));
		// f1 -> in_task [true, true]
		assert!(components.iter().any(|c| c.in_task == vec![true, true] && c.features == vec![false, true]));
	}

	#[test]
	fn partition_covers_and_is_disjoint() {
		let task_features = vec![vec![true, true, false], vec![false, true, true]];
		let components = derive_components(3, &task_features);
		let mut covered = vec![false; 3];
		for c in &components {
			for (j, &in_c) in c.features.iter().enumerate() {
				if in_c {
					assert!(!covered[j], "feature {j} covered by more than one component");
					covered[j] = true;
				}
			}
		}
		assert_eq!(covered, vec![true, true, true]);
	}

	#[test]
	fn used_components_matches_task_mask() {
		let task_features = vec![vec![true, true], vec![false, true]];
		let components = derive_components(2, &task_features);
		let used0 = used_components(&components, &task_features[0]);
		let used1 = used_components(&components, &task_features[1]);
		// Task 0 has both features, so it uses both components.
		assert_eq!(used0, vec![true, true]);
		// Task 1 only has f1, so it uses only the component owning f1.
		let f1_component = components.iter().position(|c| c.features == vec![false, true]).unwrap();
		for (k, &used) in used1.iter().enumerate() {
			assert_eq!(used, k == f1_component);
		}
	}
}
