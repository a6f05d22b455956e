//! Error types for rendering.
//!
//! None of these are recovered from internally. A failed [`Container::render`](`crate::Container::render`)
//! poisons that container until it is [reset](`crate::Container::reset`).

use crate::vnode::Key;
use thiserror::Error;

/// Errors that can occur while mounting or patching, generic over the host renderer's own error type.
#[derive(Debug, Error)]
pub enum RenderError<E: std::error::Error + 'static> {
	/// An element with an empty tag name reached the host renderer.
	#[error("invalid element tag {0:?}")]
	InvalidTag(compact_str::CompactString),

	/// Two siblings in the same child list carry the same key.
	#[error("duplicate key {key} among sibling children")]
	DuplicateKey {
		/// The repeated key.
		key: Key,
	},

	/// A previous node that should have been mounted has no anchor.
	#[error("previous node has no anchor (was it ever mounted?)")]
	MissingAnchor,

	/// The tree is deeper than [`RenderConfig::depth_limit`](`crate::RenderConfig::depth_limit`).
	#[error("depth limit of {limit} reached")]
	DepthLimit {
		/// The configured limit.
		limit: usize,
	},

	/// The container's bookkeeping may not match its live nodes after an earlier failure.
	#[error("container is poisoned by an earlier failed render")]
	Poisoned,

	/// The host renderer failed to perform a mutation.
	#[error("host renderer failed: {0}")]
	Host(#[source] E),
}

/// Result type alias for render operations.
pub type RenderResult<T, E> = Result<T, RenderError<E>>;

impl<E: std::error::Error + 'static> RenderError<E> {
	/// Whether this error came from the host renderer rather than from the tree itself.
	#[must_use]
	pub fn is_host(&self) -> bool {
		matches!(self, Self::Host(_))
	}
}
