//! Synchronized state container.

use parking_lot::RwLock;
use tracing::debug;

use crate::state::{Action, BrowserState, reduce};

type Subscriber = Box<dyn Fn(&BrowserState) + Send + Sync>;

/// Holds the [`BrowserState`] and notifies subscribers after every
/// dispatched [`Action`].
///
/// Reads never block dispatches for longer than the reducer takes;
/// subscribers run outside the state lock, on the dispatching thread.
#[derive(Default)]
pub struct BrowserStore {
	state: RwLock<BrowserState>,
	subscribers: RwLock<Vec<Subscriber>>,
}

impl BrowserStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// A clone of the current state.
	pub fn state(&self) -> BrowserState {
		self.state.read().clone()
	}

	/// Applies `action` and notifies all subscribers with the resulting
	/// state.
	pub fn dispatch(&self, action: Action) {
		debug!(target: "store", ?action, "dispatching");

		let after = {
			let mut state = self.state.write();
			reduce(&mut state, action);
			state.clone()
		};

		for subscriber in self.subscribers.read().iter() {
			subscriber(&after);
		}
	}

	/// Registers a subscriber invoked after every dispatch. Subscribers
	/// cannot be removed; drop the store to drop them.
	pub fn subscribe(&self, subscriber: impl Fn(&BrowserState) + Send + Sync + 'static) {
		self.subscribers.write().push(Box::new(subscriber));
	}
}

impl std::fmt::Debug for BrowserStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BrowserStore")
			.field("state", &*self.state.read())
			.field("subscribers", &self.subscribers.read().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;
	use crate::state::SessionState;

	#[test]
	fn subscribers_observe_every_dispatch() {
		let store = BrowserStore::new();
		let calls = Arc::new(AtomicUsize::new(0));

		let counted = calls.clone();
		store.subscribe(move |_| {
			counted.fetch_add(1, Ordering::SeqCst);
		});

		store.dispatch(Action::SelectSession { id: None });
		store.dispatch(Action::RemoveAllSessions);

		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn state_returns_reduced_snapshot() {
		let store = BrowserStore::new();
		store.dispatch(Action::AddSession {
			id: "a".to_string(),
			session: SessionState {
				url: "https://a.example".to_string(),
				private: false,
				context_id: None,
				parent_id: None,
				custom_tab: false,
				last_access: 0,
			},
		});

		let state = store.state();
		assert_eq!(state.sessions.len(), 1);
		assert!(state.sessions.contains_key("a"));
	}
}
