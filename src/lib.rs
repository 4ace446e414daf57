//! Multi-task model-based reinforcement learning over factored Markov decision processes
//! (MTA-FRMAX): component decomposition, a contextual dependency table with incremental
//! empirical-distribution updates, per-task transition/reward synthesis, and value-iteration
//! planning.
//!
//! [`mta::Mta`] is the entry point: register tasks, call [`mta::Mta::build`] once, then alternate
//! [`mta::Mta::update_with_new_observation`] and [`mta::Mta::select_best_action`] as the driving
//! agent loop observes transitions and needs actions.

pub mod cdtb;
pub mod codec;
pub mod component;
pub mod config;
pub mod error;
pub mod mta;
pub mod planner;
pub mod policy;
pub mod task;
pub mod transition;
pub mod util;

/// Test-only tracing setup, shared across modules' `#[cfg(test)]` blocks.
///
/// Activates the `tracing_subscriber::fmt()...with_env_filter(...).init()` pattern the reference
/// crate leaves commented out in its playground binary, so `RUST_LOG=debug cargo test -- --nocapture`
/// actually surfaces the `#[tracing::instrument]`/`debug!`/`trace!` call sites under test.
#[cfg(test)]
pub(crate) mod test_support {
	use std::sync::Once;

	static INIT: Once = Once::new();

	pub(crate) fn init_tracing() {
		INIT.call_once(|| {
			let _ = tracing_subscriber::fmt()
				.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
				.with_test_writer()
				.try_init();
		});
	}
}
