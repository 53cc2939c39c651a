//! One-way bridge from a `SessionManager` to a [`BrowserStore`].

use std::sync::Arc;

use session::{Session, SessionManagerObserver};
use tracing::debug;

use crate::state::{Action, SessionState};
use crate::store::BrowserStore;

/// Projects session-manager notifications into store actions.
///
/// Register the bridge on a `SessionManager`; every manager mutation then
/// shows up in the store as exactly the actions the notification implies.
/// A restore produces one bulk [`Action::RestoreSessions`] followed by at
/// most one [`Action::SelectSession`], never per-session actions.
///
/// Aggregate removal is projected as [`Action::RemoveAllSessions`] in
/// both of its forms. The manager's `remove_sessions` retains custom tab
/// sessions, but the aggregate notification does not say which form ran,
/// so the store drops its custom tab entries too and re-learns them on
/// their next notification. Consumers needing custom tabs to survive in
/// the store must not rely on it across `remove_sessions`.
pub struct StoreBridge {
	store: Arc<BrowserStore>,
}

impl StoreBridge {
	pub fn new(store: Arc<BrowserStore>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &Arc<BrowserStore> {
		&self.store
	}
}

impl SessionManagerObserver for StoreBridge {
	fn on_session_added(&self, session: &Session) {
		debug!(target: "store.bridge", id = %session.id(), "projecting added session");
		self.store.dispatch(Action::AddSession {
			id: session.id().to_string(),
			session: SessionState::from_session(session),
		});
	}

	fn on_session_removed(&self, session: &Session) {
		debug!(target: "store.bridge", id = %session.id(), "projecting removed session");
		self.store.dispatch(Action::RemoveSession {
			id: session.id().to_string(),
		});
	}

	fn on_session_selected(&self, session: &Session) {
		self.store.dispatch(Action::SelectSession {
			id: Some(session.id().to_string()),
		});
	}

	fn on_sessions_restored(&self, sessions: &[Session]) {
		debug!(target: "store.bridge", count = sessions.len(), "projecting restored sessions");
		self.store.dispatch(Action::RestoreSessions {
			sessions: sessions
				.iter()
				.map(|session| (session.id().to_string(), SessionState::from_session(session)))
				.collect(),
		});
	}

	fn on_all_sessions_removed(&self) {
		self.store.dispatch(Action::RemoveAllSessions);
	}
}
