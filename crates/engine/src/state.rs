use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque serialized engine-session state.
///
/// The schema belongs to the engine implementation. The session layer only
/// moves these blobs between live sessions and snapshots, so the payload is
/// carried as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineSessionState(Value);

impl EngineSessionState {
	pub fn new(raw: Value) -> Self {
		Self(raw)
	}

	/// Returns the raw payload.
	pub fn raw(&self) -> &Value {
		&self.0
	}

	/// True for the empty/default state (nothing to restore).
	pub fn is_empty(&self) -> bool {
		self.0.is_null()
	}
}

impl From<Value> for EngineSessionState {
	fn from(raw: Value) -> Self {
		Self(raw)
	}
}
