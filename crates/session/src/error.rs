//! Error types for the session layer.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`SessionManager`](crate::SessionManager) operations.
///
/// Every failing call is atomic: the manager's state is left exactly as it
/// was before the call.
#[derive(Debug, Error)]
pub enum Error {
	/// A session with this id is already tracked.
	#[error("session already tracked: {id}")]
	DuplicateSession { id: String },

	/// The parent given to `add` is not tracked.
	#[error("parent session not tracked: {id}")]
	UnknownParent { id: String },

	/// The session given to `select` (or another id-taking operation) is
	/// not tracked.
	#[error("session not tracked: {id}")]
	UnknownSession { id: String },

	/// A bulk add contained a custom tab session. Batch adds are for flat
	/// regular/private tab restoration only.
	#[error("custom tab session cannot be bulk-added: {id}")]
	CustomTabInBatch { id: String },

	/// A bulk add contained a session with a pre-set parent id.
	#[error("session with parent cannot be bulk-added: {id}")]
	ParentedSessionInBatch { id: String },

	/// A recorded parent id could not be resolved among tracked sessions.
	///
	/// This indicates a prior invariant violation elsewhere; it is surfaced
	/// rather than silently recovered.
	#[error("internal consistency violation: {0}")]
	InternalConsistency(String),
}
