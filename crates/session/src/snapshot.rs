//! Snapshot types for process-restart recovery.
//!
//! A snapshot is an ordered list of session/engine-state/last-access tuples
//! plus an optional selected index. Indices are only meaningful within one
//! snapshot instance. Serialization to a persisted wire format lives in the
//! store crate; these types are the in-memory boundary.

use engine::EngineSessionState;

use crate::Session;

/// One session's worth of restorable state.
#[derive(Debug, Clone)]
pub struct SnapshotItem {
	pub session: Session,
	/// Serialized engine state, if the session had a live or restored
	/// engine resource when the snapshot was taken.
	pub engine_state: Option<EngineSessionState>,
	/// Last-access timestamp (millis) at snapshot time.
	pub last_access: i64,
}

impl SnapshotItem {
	pub fn new(session: Session) -> Self {
		let last_access = session.last_access();
		Self {
			session,
			engine_state: None,
			last_access,
		}
	}

	pub fn with_engine_state(mut self, engine_state: EngineSessionState) -> Self {
		self.engine_state = Some(engine_state);
		self
	}
}

/// Restorable manager state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
	pub items: Vec<SnapshotItem>,
	/// Index of the selected session within `items`. Out-of-bounds values
	/// are tolerated on restore and treated as "no selection" since this
	/// may be cross-version persisted data.
	pub selected_index: Option<usize>,
}

impl Snapshot {
	pub fn new(items: Vec<SnapshotItem>, selected_index: Option<usize>) -> Self {
		Self {
			items,
			selected_index,
		}
	}

	/// Wraps a single item with that item selected.
	pub fn single_item(item: SnapshotItem) -> Self {
		Self {
			items: vec![item],
			selected_index: Some(0),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}
