//! State tree and actions.

use indexmap::IndexMap;
use session::Session;

/// Read-only projection of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
	pub url: String,
	pub private: bool,
	pub context_id: Option<String>,
	pub parent_id: Option<String>,
	pub custom_tab: bool,
	pub last_access: i64,
}

impl SessionState {
	pub fn from_session(session: &Session) -> Self {
		Self {
			url: session.url().to_string(),
			private: session.is_private(),
			context_id: session.context_id().map(str::to_string),
			parent_id: session.parent_id().map(str::to_string),
			custom_tab: session.is_custom_tab(),
			last_access: session.last_access(),
		}
	}
}

/// Snapshot of everything the store knows. Sessions keep the manager's
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserState {
	pub sessions: IndexMap<String, SessionState>,
	pub selected_id: Option<String>,
}

impl BrowserState {
	pub fn selected_session(&self) -> Option<&SessionState> {
		self.selected_id.as_deref().and_then(|id| self.sessions.get(id))
	}
}

/// State mutation dispatched into a [`crate::BrowserStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	AddSession { id: String, session: SessionState },
	RemoveSession { id: String },
	SelectSession { id: Option<String> },
	/// Replaces nothing, appends everything: a batch of sessions that
	/// joined the manager in one restore or bulk add.
	RestoreSessions { sessions: Vec<(String, SessionState)> },
	/// Clears every entry, custom tabs included. Dispatched for both
	/// aggregate removal forms; see the note on [`crate::StoreBridge`].
	RemoveAllSessions,
}

pub(crate) fn reduce(state: &mut BrowserState, action: Action) {
	match action {
		Action::AddSession { id, session } => {
			state.sessions.insert(id, session);
		}
		Action::RemoveSession { id } => {
			state.sessions.shift_remove(&id);
			if state.selected_id.as_deref() == Some(id.as_str()) {
				state.selected_id = None;
			}
		}
		Action::SelectSession { id } => {
			state.selected_id = id;
		}
		Action::RestoreSessions { sessions } => {
			for (id, session) in sessions {
				state.sessions.insert(id, session);
			}
		}
		Action::RemoveAllSessions => {
			state.sessions.clear();
			state.selected_id = None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn session_state(url: &str) -> SessionState {
		SessionState {
			url: url.to_string(),
			private: false,
			context_id: None,
			parent_id: None,
			custom_tab: false,
			last_access: 0,
		}
	}

	#[test]
	fn removing_selected_session_clears_selection() {
		let mut state = BrowserState::default();
		reduce(
			&mut state,
			Action::AddSession {
				id: "a".to_string(),
				session: session_state("https://a.example"),
			},
		);
		reduce(&mut state, Action::SelectSession { id: Some("a".to_string()) });

		reduce(&mut state, Action::RemoveSession { id: "a".to_string() });

		assert!(state.sessions.is_empty());
		assert_eq!(state.selected_id, None);
	}

	#[test]
	fn removing_unselected_session_keeps_selection() {
		let mut state = BrowserState::default();
		for id in ["a", "b"] {
			reduce(
				&mut state,
				Action::AddSession {
					id: id.to_string(),
					session: session_state("https://example.com"),
				},
			);
		}
		reduce(&mut state, Action::SelectSession { id: Some("b".to_string()) });

		reduce(&mut state, Action::RemoveSession { id: "a".to_string() });

		assert_eq!(state.selected_id.as_deref(), Some("b"));
		assert!(state.selected_session().is_some());
	}

	#[test]
	fn restore_appends_in_order() {
		let mut state = BrowserState::default();
		reduce(
			&mut state,
			Action::AddSession {
				id: "existing".to_string(),
				session: session_state("https://existing.example"),
			},
		);

		reduce(
			&mut state,
			Action::RestoreSessions {
				sessions: vec![
					("r1".to_string(), session_state("https://r1.example")),
					("r2".to_string(), session_state("https://r2.example")),
				],
			},
		);

		let ids: Vec<&str> = state.sessions.keys().map(String::as_str).collect();
		assert_eq!(ids, vec!["existing", "r1", "r2"]);
	}
}
