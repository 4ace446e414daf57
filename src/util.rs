//! Small free functions with no state of their own: local/global index-mask conversions, a
//! range-restricted RNG helper, and a string splitter. Ported from `original_source/Utility.cpp`
//! (`randInRange`, `explode`) plus the local/global mask helpers the original inlines at call
//! sites; kept tiny and free of dependencies, matching how the teacher keeps its own leaf
//! utility functions driver-side rather than bundled into a type.

use rand::Rng;

use crate::error::IndexError;

/// Finds the `local`-th set bit of `mask`, returning its position. This is the "local index
/// within a task's own feature/action space maps to which global index" direction.
pub fn local_to_global(mask: &[bool], local: usize) -> Result<usize, IndexError> {
	let mut seen: usize = 0;
	for (global, &set) in mask.iter().enumerate() {
		if set {
			if seen == local {
				return Ok(global);
			}
			seen += 1;
		}
	}
	Err(IndexError::LocalOutOfRange { local, set_bits: seen })
}

/// Counts the set bits of `mask` before position `global`. This is the inverse of
/// [`local_to_global`]: "this global index maps to which local index within a task's own
/// feature/action space".
pub fn global_to_local(mask: &[bool], global: usize) -> Result<usize, IndexError> {
	if global >= mask.len() || !mask[global] {
		return Err(IndexError::NotInMask { global });
	}
	Ok(mask[..global].iter().filter(|&&b| b).count())
}

/// Draws a uniformly random integer in `[low, high]` inclusive.
pub fn rand_in_range(low: i64, high: i64) -> i64 {
	rand::thread_rng().gen_range(low..=high)
}

/// Splits `s` on `delimiter`, mirroring `explode`'s `getline(iss, token, delim)` loop: a run of
/// consecutive delimiters yields empty fields in the middle of the result (`"a,,b"` splits to
/// `["a", "", "b"]`), but a delimiter at the very end of `s` yields no trailing field, since the
/// final `getline` call finds nothing left to extract and fails rather than returning `""`.
pub fn split(s: &str, delimiter: char) -> Vec<String> {
	let mut fields: Vec<String> = s.split(delimiter).map(str::to_owned).collect();
	if fields.last().is_some_and(|field| field.is_empty()) {
		fields.pop();
	}
	fields
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn local_global_round_trip() {
		let mask = vec![false, true, false, true, true];
		assert_eq!(local_to_global(&mask, 0).unwrap(), 1);
		assert_eq!(local_to_global(&mask, 1).unwrap(), 3);
		assert_eq!(local_to_global(&mask, 2).unwrap(), 4);
		for global in [1usize, 3, 4] {
			let local = global_to_local(&mask, global).unwrap();
			assert_eq!(local_to_global(&mask, local).unwrap(), global);
		}
	}

	#[test]
	fn global_to_local_rejects_unset_position() {
		let mask = vec![true, false, true];
		assert!(matches!(global_to_local(&mask, 1), Err(IndexError::NotInMask { global: 1 })));
	}

	#[test]
	fn local_to_global_rejects_out_of_range() {
		let mask = vec![true, false];
		assert!(matches!(local_to_global(&mask, 5), Err(IndexError::LocalOutOfRange { local: 5, set_bits: 1 })));
	}

	#[test]
	fn rand_in_range_stays_in_bounds() {
		for _ in 0..100 {
			let v = rand_in_range(3, 7);
			assert!((3..=7).contains(&v));
		}
	}

	#[test]
	fn split_keeps_interior_empty_fields_like_getline() {
		assert_eq!(split("a,,b,c", ','), vec!["a", "", "b", "c"]);
	}

	#[test]
	fn split_drops_only_a_trailing_empty_field() {
		assert_eq!(split("a,b,", ','), vec!["a", "b"]);
		assert_eq!(split(",", ','), vec![""]);
		assert_eq!(split("", ','), Vec::<String>::new());
	}
}
