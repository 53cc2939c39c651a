//! Engine capability consumed by the session layer.
//!
//! The session manager never talks to a rendering engine directly. It works
//! against the [`Engine`] and [`EngineSession`] traits defined here: an
//! engine can create render sessions, and a render session can load a URL,
//! save/restore its serialized state, and be asked to close. Concrete
//! implementations (GeckoView, WebView, ...) live outside this workspace.
//!
//! [`FakeEngine`] is an in-memory double for exercising the session layer
//! without a real engine.

mod fake;
mod state;

pub use fake::{CloseProbe, FakeEngine, FakeEngineSession};
pub use state::EngineSessionState;

/// Capability to create render sessions.
pub trait Engine {
	/// Creates a new render session. `private` sessions must not share
	/// storage with regular ones.
	fn create_session(&self, private: bool) -> Box<dyn EngineSession>;

	/// Turns a persisted raw blob back into an [`EngineSessionState`].
	///
	/// Engines that version their state format can migrate or reject blobs
	/// here; the default keeps the blob as-is.
	fn create_session_state(&self, raw: serde_json::Value) -> EngineSessionState {
		EngineSessionState::new(raw)
	}
}

/// A live render session owned by the session layer through a link table.
pub trait EngineSession {
	/// Starts loading the given URL.
	fn load_url(&mut self, url: &str);

	/// Requests that the underlying resource be released.
	///
	/// Fire-and-forget: the caller does not wait for completion and may
	/// request close more than once.
	fn request_close(&mut self);

	/// Serializes the current session state.
	fn save_state(&self) -> EngineSessionState;

	/// Applies previously saved state to this session.
	fn restore_state(&mut self, state: &EngineSessionState);
}
