//! Hand-rolled error taxonomy, one type per failure category.
//!
//! No derive-macro error crate is used here, in keeping with this crate's habit of writing
//! small `Display`/`Error` impls by hand rather than reaching for a dependency (see e.g.
//! [`crate::component`]'s registry errors).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised by the state codec ([`crate::codec`]).
#[derive(Debug)]
pub enum CodecError {
	/// A relevant position held the sentinel `-1` where a concrete value was required.
	InvalidFeature {
		/// Index of the offending feature.
		index: usize,
	},
	/// `state`, `size`, and `relevance` did not all have the same length.
	MaskMismatch {
		/// Length of the state vector.
		state_len: usize,
		/// Length of the size vector.
		size_len: usize,
		/// Length of the relevance mask.
		relevance_len: usize,
	},
}

impl fmt::Display for CodecError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidFeature { index } => {
				write!(f, "feature {index} is relevant but unset (-1)")
			},
			Self::MaskMismatch { state_len, size_len, relevance_len } => {
				write!(
					f,
					"codec length mismatch: state={state_len}, size={size_len}, relevance={relevance_len}"
				)
			},
		}
	}
}

impl std::error::Error for CodecError {}

/// Errors raised while reading or writing a policy file ([`crate::policy`]).
#[derive(Debug)]
pub enum PolicyError {
	/// The underlying file operation failed.
	Io {
		/// Path that was being read or written.
		path: PathBuf,
		/// Underlying I/O failure.
		source: io::Error,
	},
	/// The file did not have the expected number of lines.
	ShapeMismatch {
		/// Number of lines expected (`S + 1`).
		expected: usize,
		/// Number of lines actually found.
		found: usize,
	},
}

impl fmt::Display for PolicyError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Io { path, source } => {
				write!(f, "policy I/O error at {}: {source}", path.display())
			},
			Self::ShapeMismatch { expected, found } => {
				write!(f, "policy file has {found} lines, expected {expected}")
			},
		}
	}
}

impl std::error::Error for PolicyError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io { source, .. } => Some(source),
			Self::ShapeMismatch { .. } => None,
		}
	}
}

/// Errors raised while enumerating a CDTB distribution row or synthesizing a task's transition
/// function ([`crate::cdtb`], [`crate::transition`], [`crate::task`]).
#[derive(Debug)]
pub enum CdtbError {
	/// A parent row with a sufficient exploration count had zero probability mass.
	///
	/// This should be unreachable once [`crate::cdtb::CdtbCell::exploration_count`] has met the
	/// exploration threshold; treated as fatal rather than routed to the fictitious state.
	EmptyDistribution {
		/// Component index.
		component: usize,
		/// Global action index.
		action: usize,
		/// Parent row index.
		parent: usize,
	},
	/// A codec error surfaced while encoding a parent or child state during transition synthesis
	/// or action selection.
	Codec(CodecError),
	/// A local/global index-mapping error surfaced while translating a task's local action index.
	Index(IndexError),
}

impl fmt::Display for CdtbError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::EmptyDistribution { component, action, parent } => write!(
				f,
				"CDTB cell (component={component}, action={action}) has an empty distribution \
				 at parent={parent} despite a sufficient exploration count"
			),
			Self::Codec(err) => write!(f, "{err}"),
			Self::Index(err) => write!(f, "{err}"),
		}
	}
}

impl std::error::Error for CdtbError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::EmptyDistribution { .. } => None,
			Self::Codec(err) => Some(err),
			Self::Index(err) => Some(err),
		}
	}
}

impl From<CodecError> for CdtbError {
	fn from(err: CodecError) -> Self {
		Self::Codec(err)
	}
}

impl From<IndexError> for CdtbError {
	fn from(err: IndexError) -> Self {
		Self::Index(err)
	}
}

/// Errors raised while validating a [`crate::config::Config`].
#[derive(Debug)]
pub enum ConfigError {
	/// A feature's domain size was not positive.
	InvalidFeatureSize {
		/// Feature index.
		index: usize,
		/// The offending (non-positive) size.
		size: u32,
	},
	/// `total_actions` was zero.
	NoActions,
	/// `exploration_threshold` was zero.
	NoExplorationThreshold,
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidFeatureSize { index, size } => {
				write!(f, "feature {index} has non-positive domain size {size}")
			},
			Self::NoActions => write!(f, "total_actions must be at least 1"),
			Self::NoExplorationThreshold => write!(f, "exploration_threshold must be at least 1"),
		}
	}
}

impl std::error::Error for ConfigError {}

/// Errors raised while mapping between a task's local index space and the global one
/// ([`crate::task`]).
#[derive(Debug)]
pub enum IndexError {
	/// The requested global index is not part of the given mask.
	NotInMask {
		/// The global index that was looked up.
		global: usize,
	},
	/// The requested local index has no corresponding set bit in the mask.
	LocalOutOfRange {
		/// The local index that was looked up.
		local: usize,
		/// Number of set bits in the mask.
		set_bits: usize,
	},
}

impl fmt::Display for IndexError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotInMask { global } => write!(f, "global index {global} is not set in this task's mask"),
			Self::LocalOutOfRange { local, set_bits } => {
				write!(f, "local index {local} out of range (mask has {set_bits} set bits)")
			},
		}
	}
}

impl std::error::Error for IndexError {}

/// Top-level error for [`crate::mta::Mta`] entry points, wrapping the lower-level error kinds
/// that can surface through observation ingestion and action selection.
#[derive(Debug)]
pub enum MtaError {
	/// No task with this name was registered.
	UnknownTask {
		/// The name that was looked up.
		name: String,
	},
	/// A codec error surfaced while encoding an observation or probe.
	Codec(CodecError),
	/// A CDTB error surfaced while synthesizing a task's transition function.
	Cdtb(CdtbError),
}

impl fmt::Display for MtaError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnknownTask { name } => write!(f, "no task named {name:?} is registered"),
			Self::Codec(err) => write!(f, "{err}"),
			Self::Cdtb(err) => write!(f, "{err}"),
		}
	}
}

impl std::error::Error for MtaError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::UnknownTask { .. } => None,
			Self::Codec(err) => Some(err),
			Self::Cdtb(err) => Some(err),
		}
	}
}

impl From<CodecError> for MtaError {
	fn from(err: CodecError) -> Self {
		Self::Codec(err)
	}
}

impl From<CdtbError> for MtaError {
	fn from(err: CdtbError) -> Self {
		Self::Cdtb(err)
	}
}
