//! In-memory engine double for exercising the session layer in tests.
//!
//! [`FakeEngineSession`] records every `load_url` and `request_close` call.
//! Because the session manager takes ownership of engine sessions, each fake
//! hands out a [`CloseProbe`] sharing the same recording, so tests can keep
//! asserting after the `Box<dyn EngineSession>` has moved.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::{Engine, EngineSession, EngineSessionState};

#[derive(Default)]
struct Recording {
	closed: usize,
	loaded: Vec<String>,
	restored: Option<EngineSessionState>,
}

/// Shared view into a [`FakeEngineSession`]'s recording.
#[derive(Clone)]
pub struct CloseProbe {
	recording: Rc<RefCell<Recording>>,
}

impl CloseProbe {
	/// Number of times `request_close` was called.
	pub fn close_count(&self) -> usize {
		self.recording.borrow().closed
	}

	/// URLs passed to `load_url`, in order.
	pub fn loaded_urls(&self) -> Vec<String> {
		self.recording.borrow().loaded.clone()
	}

	/// State applied via `restore_state`, if any.
	pub fn restored_state(&self) -> Option<EngineSessionState> {
		self.recording.borrow().restored.clone()
	}
}

/// Recording [`EngineSession`] double.
pub struct FakeEngineSession {
	recording: Rc<RefCell<Recording>>,
	private: bool,
}

impl FakeEngineSession {
	pub fn new() -> Self {
		Self::with_private(false)
	}

	pub fn with_private(private: bool) -> Self {
		Self {
			recording: Rc::new(RefCell::new(Recording::default())),
			private,
		}
	}

	pub fn probe(&self) -> CloseProbe {
		CloseProbe {
			recording: Rc::clone(&self.recording),
		}
	}

	pub fn is_private(&self) -> bool {
		self.private
	}
}

impl Default for FakeEngineSession {
	fn default() -> Self {
		Self::new()
	}
}

impl EngineSession for FakeEngineSession {
	fn load_url(&mut self, url: &str) {
		self.recording.borrow_mut().loaded.push(url.to_string());
	}

	fn request_close(&mut self) {
		self.recording.borrow_mut().closed += 1;
	}

	fn save_state(&self) -> EngineSessionState {
		let recording = self.recording.borrow();
		EngineSessionState::new(json!({
			"url": recording.loaded.last(),
			"private": self.private,
		}))
	}

	fn restore_state(&mut self, state: &EngineSessionState) {
		self.recording.borrow_mut().restored = Some(state.clone());
	}
}

/// [`Engine`] double that keeps a probe for every session it creates.
#[derive(Default)]
pub struct FakeEngine {
	created: RefCell<Vec<CloseProbe>>,
}

impl FakeEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of sessions created so far.
	pub fn created_count(&self) -> usize {
		self.created.borrow().len()
	}

	/// Probe for the nth created session.
	pub fn probe(&self, index: usize) -> CloseProbe {
		self.created.borrow()[index].clone()
	}
}

impl Engine for FakeEngine {
	fn create_session(&self, private: bool) -> Box<dyn EngineSession> {
		let session = FakeEngineSession::with_private(private);
		self.created.borrow_mut().push(session.probe());
		Box::new(session)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn probe_outlives_moved_session() {
		let session = FakeEngineSession::new();
		let probe = session.probe();

		let mut boxed: Box<dyn EngineSession> = Box::new(session);
		boxed.load_url("https://example.com");
		boxed.request_close();
		drop(boxed);

		assert_eq!(probe.close_count(), 1);
		assert_eq!(probe.loaded_urls(), vec!["https://example.com"]);
	}

	#[test]
	fn engine_tracks_created_sessions() {
		let engine = FakeEngine::new();
		let mut a = engine.create_session(false);
		let _b = engine.create_session(true);

		a.request_close();

		assert_eq!(engine.created_count(), 2);
		assert_eq!(engine.probe(0).close_count(), 1);
		assert_eq!(engine.probe(1).close_count(), 0);
	}

	#[test]
	fn save_state_round_trips_through_restore() {
		let mut session = FakeEngineSession::new();
		session.load_url("https://www.mozilla.org");
		let state = session.save_state();

		let mut other = FakeEngineSession::new();
		other.restore_state(&state);

		assert_eq!(other.probe().restored_state(), Some(state));
	}
}
