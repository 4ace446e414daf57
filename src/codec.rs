//! Bijection between a factored state vector and a flat integer, restricted to a relevance
//! mask. See `original_source/Utility.cpp` (`MapFactoredStateToInt` / `MapIntStateToVector`)
//! for the algorithm this is ported from.

use crate::error::CodecError;

/// Sentinel for "this feature has no value".
pub const UNSET: i32 = -1;

/// Flattens `state` into an integer, walking features from last to first and skipping any
/// position where `relevance[i]` is `false`.
///
/// Fails with [`CodecError::InvalidFeature`] if a relevant position holds [`UNSET`].
pub fn encode(state: &[i32], size: &[u32], relevance: &[bool]) -> Result<usize, CodecError> {
	check_lengths(state, size, relevance)?;

	let mut multiplier: usize = 1;
	let mut result: usize = 0;
	for i in (0..state.len()).rev() {
		if !relevance[i] {
			continue;
		}
		if state[i] == UNSET {
			return Err(CodecError::InvalidFeature { index: i });
		}
		result += (state[i] as usize) * multiplier;
		multiplier *= size[i] as usize;
	}
	Ok(result)
}

/// Inverse of [`encode`]: unpacks `flat` into a state vector, leaving non-relevant positions
/// at [`UNSET`].
pub fn decode(flat: usize, size: &[u32], relevance: &[bool]) -> Vec<i32> {
	let mut result: Vec<i32> = vec![UNSET; size.len()];
	let mut multiplier: usize = 1;
	let mut remaining: usize = flat;

	for i in (0..size.len()).rev() {
		let next_multiplier: usize = multiplier * size[i] as usize;
		if relevance[i] {
			let temp: usize = remaining % next_multiplier;
			result[i] = (temp / multiplier) as i32;
			remaining -= temp;
			multiplier = next_multiplier;
		}
	}
	result
}

/// Encodes the FSA parent index from the concatenation `[current_state || next_state]` over
/// the doubled size vector `[size || size]`.
///
/// `parent_features` must have length `2 * size.len()`: the first half marks previous-step
/// parents, the second half marks current-step parents. Positions where a parent bit is unset
/// are normalized to `0` before encoding (the codec requires nonnegative inputs), which is what
/// lets callers pass a `next_state` that is still only partially filled in.
pub fn encode_parent_fsa(
	current_state: &[i32],
	next_state: &[i32],
	size: &[u32],
	parent_features: &[bool],
) -> Result<usize, CodecError> {
	let f: usize = size.len();
	if current_state.len() != f || next_state.len() != f || parent_features.len() != 2 * f {
		return Err(CodecError::MaskMismatch {
			state_len: current_state.len(),
			size_len: size.len(),
			relevance_len: parent_features.len(),
		});
	}

	let mut concat_state: Vec<i32> = Vec::with_capacity(2 * f);
	concat_state.extend_from_slice(current_state);
	concat_state.extend_from_slice(next_state);

	for (j, &value) in concat_state.iter().enumerate() {
		if value == UNSET && parent_features[j] {
			return Err(CodecError::InvalidFeature { index: j });
		}
	}
	for value in concat_state.iter_mut() {
		if *value == UNSET {
			*value = 0;
		}
	}

	let mut doubled_size: Vec<u32> = Vec::with_capacity(2 * f);
	doubled_size.extend_from_slice(size);
	doubled_size.extend_from_slice(size);

	encode(&concat_state, &doubled_size, parent_features)
}

fn check_lengths(state: &[i32], size: &[u32], relevance: &[bool]) -> Result<(), CodecError> {
	if state.len() != size.len() || state.len() != relevance.len() {
		return Err(CodecError::MaskMismatch {
			state_len: state.len(),
			size_len: size.len(),
			relevance_len: relevance.len(),
		});
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn round_trip() {
		let size: Vec<u32> = vec![2, 3, 4];
		let relevance: Vec<bool> = vec![true, true, true];
		for a in 0..2 {
			for b in 0..3 {
				for c in 0..4 {
					let state: Vec<i32> = vec![a, b, c];
					let flat: usize = encode(&state, &size, &relevance).unwrap();
					assert_eq!(decode(flat, &size, &relevance), state);
				}
			}
		}
	}

	#[test]
	fn non_relevant_stays_unset() {
		let size: Vec<u32> = vec![2, 3, 4];
		let relevance: Vec<bool> = vec![true, false, true];
		let state: Vec<i32> = vec![1, UNSET, 2];
		let flat: usize = encode(&state, &size, &relevance).unwrap();
		assert_eq!(decode(flat, &size, &relevance), state);
	}

	#[test]
	fn invalid_feature_on_unset_relevant() {
		let size: Vec<u32> = vec![2, 3];
		let relevance: Vec<bool> = vec![true, true];
		let state: Vec<i32> = vec![UNSET, 1];
		let err = encode(&state, &size, &relevance).unwrap_err();
		assert!(matches!(err, CodecError::InvalidFeature { index: 0 }));
	}

	#[test]
	fn mask_mismatch() {
		let err = encode(&[1, 2], &[2], &[true, true]).unwrap_err();
		assert!(matches!(err, CodecError::MaskMismatch { .. }));
	}

	#[test]
	fn fsa_parent_normalizes_irrelevant_unset() {
		// f0 relevant at previous step only, f1 relevant at current step only.
		let size: Vec<u32> = vec![2, 2];
		let parent_features: Vec<bool> = vec![true, false, false, true];
		let current: Vec<i32> = vec![1, UNSET];
		let next: Vec<i32> = vec![UNSET, 0];
		let p = encode_parent_fsa(&current, &next, &size, &parent_features).unwrap();

		let doubled_size: Vec<u32> = vec![2, 2, 2, 2];
		let expected = encode(&[1, 0, 0, 0], &doubled_size, &parent_features).unwrap();
		assert_eq!(p, expected);
	}

	#[test]
	fn fsa_parent_fails_on_unset_required_position() {
		let size: Vec<u32> = vec![2];
		let parent_features: Vec<bool> = vec![true, false];
		let current: Vec<i32> = vec![UNSET];
		let next: Vec<i32> = vec![UNSET];
		let err = encode_parent_fsa(&current, &next, &size, &parent_features).unwrap_err();
		assert!(matches!(err, CodecError::InvalidFeature { .. }));
	}
}
