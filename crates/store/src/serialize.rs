//! Persisted snapshot wire format.
//!
//! The document is plain JSON: a `version` marker, the persisted sessions
//! in manager order, and the selected index. The format is tolerant on
//! read where the data may come from another build: unknown fields are
//! ignored and an out-of-bounds or negative `selectedIndex` reads as "no
//! selection".

use engine::EngineSessionState;
use serde::{Deserialize, Serialize};
use session::{CustomTabConfig, Session, Snapshot, SnapshotItem};
use tracing::warn;

use crate::error::{Error, Result};

/// Current wire format version.
pub const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument {
	version: u32,
	#[serde(default)]
	selected_index: Option<i64>,
	sessions: Vec<SessionRecord>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
	id: String,
	url: String,
	private: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	context_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	parent_id: Option<String>,
	custom_tab: bool,
	last_access: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	engine_state: Option<EngineSessionState>,
}

impl SessionRecord {
	fn from_item(item: &SnapshotItem) -> Self {
		let session = &item.session;
		Self {
			id: session.id().to_string(),
			url: session.url().to_string(),
			private: session.is_private(),
			context_id: session.context_id().map(str::to_string),
			parent_id: session.parent_id().map(str::to_string),
			custom_tab: session.is_custom_tab(),
			last_access: item.last_access,
			engine_state: item.engine_state.clone(),
		}
	}

	fn into_item(self) -> SnapshotItem {
		let mut session = Session::new(self.url).with_id(self.id).with_private(self.private);
		if let Some(context_id) = self.context_id {
			session = session.with_context_id(context_id);
		}
		if let Some(parent_id) = self.parent_id {
			session = session.with_parent_id(parent_id);
		}
		if self.custom_tab {
			session = session.with_custom_tab_config(CustomTabConfig::default());
		}
		session.set_last_access(self.last_access);

		SnapshotItem {
			session,
			engine_state: self.engine_state,
			last_access: self.last_access,
		}
	}
}

/// Serializes a snapshot into the persisted JSON document.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String> {
	let document = SnapshotDocument {
		version: VERSION,
		selected_index: snapshot.selected_index.map(|index| index as i64),
		sessions: snapshot.items.iter().map(SessionRecord::from_item).collect(),
	};
	Ok(serde_json::to_string(&document)?)
}

/// Reads a snapshot back from the persisted JSON document.
pub fn snapshot_from_json(json: &str) -> Result<Snapshot> {
	let document: SnapshotDocument = serde_json::from_str(json)?;
	if document.version != VERSION {
		return Err(Error::UnsupportedVersion {
			version: document.version,
		});
	}

	let count = document.sessions.len() as i64;
	let selected_index = match document.selected_index {
		Some(index) if (0..count).contains(&index) => Some(index as usize),
		Some(index) => {
			warn!(target: "store", index, "persisted selection index out of bounds");
			None
		}
		None => None,
	};

	let items = document.sessions.into_iter().map(SessionRecord::into_item).collect();
	Ok(Snapshot::new(items, selected_index))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn round_trip_preserves_sessions_and_selection() {
		let parent = Session::new("https://parent.example").with_context_id("work");
		let parent_id = parent.id().to_string();
		let child = Session::new("https://child.example")
			.with_parent_id(parent_id.clone())
			.with_private(false);

		let state = EngineSessionState::new(json!({ "scroll": 10 }));
		let snapshot = Snapshot::new(
			vec![
				SnapshotItem::new(parent).with_engine_state(state.clone()),
				SnapshotItem::new(child),
			],
			Some(1),
		);

		let restored = snapshot_from_json(&snapshot_to_json(&snapshot).unwrap()).unwrap();

		assert_eq!(restored.items.len(), 2);
		assert_eq!(restored.selected_index, Some(1));
		assert_eq!(restored.items[0].session.id(), parent_id);
		assert_eq!(restored.items[0].session.context_id(), Some("work"));
		assert_eq!(restored.items[0].engine_state, Some(state));
		assert_eq!(restored.items[1].session.parent_id(), Some(parent_id.as_str()));
	}

	#[test]
	fn last_access_survives_the_round_trip() {
		let mut session = Session::new("https://www.mozilla.org");
		session.set_last_access(42_000);
		let snapshot = Snapshot::single_item(SnapshotItem::new(session));

		let restored = snapshot_from_json(&snapshot_to_json(&snapshot).unwrap()).unwrap();

		assert_eq!(restored.items[0].last_access, 42_000);
		assert_eq!(restored.items[0].session.last_access(), 42_000);
	}

	#[test]
	fn out_of_bounds_selected_index_reads_as_no_selection() {
		let document = json!({
			"version": 1,
			"selectedIndex": 5,
			"sessions": [
				{ "id": "a", "url": "https://a.example", "private": false, "customTab": false, "lastAccess": 0 }
			]
		});

		let snapshot = snapshot_from_json(&document.to_string()).unwrap();
		assert_eq!(snapshot.items.len(), 1);
		assert_eq!(snapshot.selected_index, None);
	}

	#[test]
	fn negative_selected_index_reads_as_no_selection() {
		let document = json!({
			"version": 1,
			"selectedIndex": -1,
			"sessions": []
		});

		let snapshot = snapshot_from_json(&document.to_string()).unwrap();
		assert_eq!(snapshot.selected_index, None);
	}

	#[test]
	fn missing_selected_index_is_tolerated() {
		let document = json!({
			"version": 1,
			"sessions": []
		});

		let snapshot = snapshot_from_json(&document.to_string()).unwrap();
		assert_eq!(snapshot.selected_index, None);
	}

	#[test]
	fn unknown_version_is_rejected() {
		let document = json!({
			"version": 99,
			"selectedIndex": null,
			"sessions": []
		});

		let err = snapshot_from_json(&document.to_string()).unwrap_err();
		assert!(matches!(err, Error::UnsupportedVersion { version: 99 }));
	}
}
