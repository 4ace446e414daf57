//! Synchronous value iteration over a task's state space. Ported from
//! `original_source/ValueIteration.h`'s `doValueIteration`, with the `write`/`read` persistence
//! split out into [`crate::policy`].

use tracing::{debug, trace, warn};

/// A defensive ceiling on Bellman sweeps; termination is still precision-driven (§4.6), this
/// only guards against non-convergent inputs.
const MAX_ITERATIONS: u64 = 10_000;

/// Warm-started value/policy arrays for one task's `S+1`-state MDP.
#[derive(Debug, Clone)]
pub struct Planner {
	/// Per-state value estimate, retained across calls for warm start.
	pub values: Vec<f64>,
	/// Per-state greedy local action index, valid only where some action is applicable.
	pub actions: Vec<usize>,
	num_states: usize,
	num_actions: usize,
	discount: f64,
}

impl Planner {
	/// Builds a planner with `values[s] = rmax / 0.1` for all `s`, per §3's initial-values
	/// invariant.
	pub fn new(num_states: usize, num_actions: usize, discount: f64, rmax: i64) -> Self {
		Self {
			values: vec![rmax as f64 / 0.1; num_states],
			actions: vec![0; num_states],
			num_states,
			num_actions,
			discount,
		}
	}

	/// Runs synchronous Bellman sweeps until the max-norm change across all states drops below
	/// `target_precision`, or [`MAX_ITERATIONS`] sweeps have run.
	#[tracing::instrument(skip(self, reward, transition, applicable))]
	pub fn run(
		&mut self,
		reward: &[Vec<f64>],
		transition: &[Vec<Vec<(usize, f64)>>],
		applicable: &[Vec<bool>],
		target_precision: f64,
	) {
		let mut iteration: u64 = 0;
		loop {
			let mut max_change: f64 = 0.0;

			for s in 0..self.num_states {
				let mut best_value: Option<f64> = None;
				let mut best_action: usize = self.actions[s];

				for a in 0..self.num_actions {
					if !applicable[s][a] {
						continue;
					}
					let mut q: f64 = reward[s][a];
					for &(next, p) in &transition[s][a] {
						q += self.discount * p * self.values[next];
					}
					if best_value.is_none_or(|v| q > v) {
						best_value = Some(q);
						best_action = a;
					}
				}

				if let Some(new_value) = best_value {
					let change: f64 = (new_value - self.values[s]).abs();
					if change > max_change {
						max_change = change;
					}
					self.values[s] = new_value;
					self.actions[s] = best_action;
				}
			}

			iteration += 1;
			trace!(iteration, max_change, "value iteration sweep");

			if max_change < target_precision {
				debug!(iteration, "value iteration converged");
				break;
			}
			if iteration >= MAX_ITERATIONS {
				warn!(iteration, max_change, target_precision, "value iteration hit the sweep ceiling without converging");
				break;
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn deterministic_vi_chain_converges_to_known_values() {
		// s0 -> s1 -> s2 (absorbing), reward 1 on every transition, discount 0.5.
		let reward = vec![vec![1.0], vec![1.0], vec![1.0]];
		let transition = vec![vec![vec![(1, 1.0)]], vec![vec![(2, 1.0)]], vec![vec![(2, 1.0)]]];
		let applicable = vec![vec![true]; 3];

		let mut planner = Planner::new(3, 1, 0.5, 0);
		planner.run(&reward, &transition, &applicable, 1e-9);

		// v2 = 1/(1-0.5) = 2, v1 = 1 + 0.5*2 = 2, v0 = 1 + 0.5*2 = 2
		assert!((planner.values[2] - 2.0).abs() < 1e-6);
		assert!((planner.values[1] - 2.0).abs() < 1e-6);
		assert!((planner.values[0] - 2.0).abs() < 1e-6);
	}

	#[test]
	fn unapplicable_state_keeps_initial_value() {
		let reward = vec![vec![1.0]];
		let transition = vec![vec![vec![(0, 1.0)]]];
		let applicable = vec![vec![false]];

		let mut planner = Planner::new(1, 1, 0.9, 10);
		let initial = planner.values[0];
		planner.run(&reward, &transition, &applicable, 1e-6);
		assert_eq!(planner.values[0], initial);
	}

	#[test]
	fn picks_the_higher_reward_action() {
		let reward = vec![vec![1.0, 5.0]];
		let transition = vec![vec![vec![(0, 1.0)], vec![(0, 1.0)]]];
		let applicable = vec![vec![true, true]];

		let mut planner = Planner::new(1, 2, 0.0, 0);
		planner.run(&reward, &transition, &applicable, 1e-6);
		assert_eq!(planner.actions[0], 1);
	}
}
