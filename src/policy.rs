//! Text dump/read of a task's per-state policy array. Ported from
//! `original_source/ValueIteration.h`'s `write`/`read`: one local action integer per line, no
//! version header, compatibility is positional.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::PolicyError;

/// Writes `actions` (one entry per state, including the fictitious state) to `path`, one integer
/// per line. Creates or overwrites the file.
#[tracing::instrument(skip(actions))]
pub fn write(path: &Path, actions: &[usize]) -> Result<(), PolicyError> {
	let body: String = actions.iter().map(|a| a.to_string()).collect::<Vec<_>>().join("\n");
	fs::write(path, body).map_err(|source| PolicyError::Io { path: path.to_path_buf(), source })?;
	debug!(path = %path.display(), lines = actions.len(), "policy written");
	Ok(())
}

/// Reads a policy file written by [`write`], requiring exactly `expected_states` lines.
#[tracing::instrument]
pub fn read(path: &Path, expected_states: usize) -> Result<Vec<usize>, PolicyError> {
	let body: String = fs::read_to_string(path).map_err(|source| PolicyError::Io { path: path.to_path_buf(), source })?;
	let actions: Vec<usize> = body
		.lines()
		.filter(|line| !line.is_empty())
		.map(|line| line.trim().parse::<usize>())
		.collect::<Result<_, _>>()
		.map_err(|_| PolicyError::ShapeMismatch { expected: expected_states, found: 0 })?;

	if actions.len() != expected_states {
		return Err(PolicyError::ShapeMismatch { expected: expected_states, found: actions.len() });
	}
	debug!(path = %path.display(), lines = actions.len(), "policy read");
	Ok(actions)
}

#[cfg(test)]
mod test {
	use super::*;
	use std::env;

	fn temp_path(name: &str) -> std::path::PathBuf {
		env::temp_dir().join(format!("mta-frmax-policy-test-{name}-{}", std::process::id()))
	}

	#[test]
	fn round_trip_write_then_read() {
		let path = temp_path("round-trip");
		let actions: Vec<usize> = vec![0, 2, 1, 3];
		write(&path, &actions).unwrap();
		let read_back = read(&path, actions.len()).unwrap();
		assert_eq!(read_back, actions);
		fs::remove_file(&path).ok();
	}

	#[test]
	fn read_rejects_wrong_line_count() {
		let path = temp_path("shape-mismatch");
		write(&path, &[0, 1, 2]).unwrap();
		let err = read(&path, 5).unwrap_err();
		assert!(matches!(err, PolicyError::ShapeMismatch { expected: 5, found: 3 }));
		fs::remove_file(&path).ok();
	}

	#[test]
	fn read_reports_io_error_for_missing_file() {
		let path = temp_path("does-not-exist");
		let err = read(&path, 1).unwrap_err();
		assert!(matches!(err, PolicyError::Io { .. }));
	}
}
