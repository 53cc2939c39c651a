//! Bounded most-recently-selected tracking for sessions with a warm engine
//! resource.
//!
//! Recency is defined purely by the order of [`OpenSessionTracker::select`]
//! calls, not by timestamps. The front of the deque is the most recently
//! selected id.

use std::collections::VecDeque;

use tracing::debug;

/// Default bound on the number of sessions kept warm.
pub const DEFAULT_MAX_OPEN_SESSIONS: usize = 4;

/// Order-preserving, bounded set of session ids.
///
/// Eviction (dropping an id off the back because the bound was exceeded)
/// reports the evicted id through a caller-supplied callback so the owner
/// can release the associated engine resource. Plain removal never does.
#[derive(Debug)]
pub struct OpenSessionTracker {
	ids: VecDeque<String>,
	max_open: usize,
}

impl Default for OpenSessionTracker {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_OPEN_SESSIONS)
	}
}

impl OpenSessionTracker {
	/// Creates a tracker bounded to `max_open` entries (clamped to at
	/// least one).
	pub fn new(max_open: usize) -> Self {
		Self {
			ids: VecDeque::new(),
			max_open: max_open.max(1),
		}
	}

	pub fn max_open(&self) -> usize {
		self.max_open
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Most recently selected id, if any.
	pub fn front(&self) -> Option<&str> {
		self.ids.front().map(String::as_str)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.ids.iter().any(|existing| existing == id)
	}

	/// Ids from most to least recently selected.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.ids.iter().map(String::as_str)
	}

	/// Moves `id` to the front, inserting it if absent, then evicts from
	/// the back until the bound holds. Evicted ids are passed to
	/// `on_evict`; the just-selected id is never evicted and the tracker
	/// never shrinks below one entry here.
	pub fn select(&mut self, id: &str, mut on_evict: impl FnMut(&str)) {
		if self.front() == Some(id) {
			return;
		}

		self.remove(id);
		self.ids.push_front(id.to_string());

		while self.ids.len() > self.max_open {
			// max_open >= 1, so this can never pop the id just pushed.
			if let Some(evicted) = self.ids.pop_back() {
				debug!(target: "session.tracker", id = %evicted, "evicting least recently selected session");
				on_evict(&evicted);
			}
		}
	}

	/// Drops `id` if present. Removal is not eviction: no callback fires.
	pub fn remove(&mut self, id: &str) {
		self.ids.retain(|existing| existing != id);
	}

	/// Evicts every id except `keep`, reporting each through `on_evict`.
	/// Leaves one entry if `keep` was present, zero otherwise.
	pub fn trim_to_selected(&mut self, keep: &str, mut on_evict: impl FnMut(&str)) {
		let ids = std::mem::take(&mut self.ids);
		for id in ids {
			if id == keep {
				self.ids.push_back(id);
			} else {
				debug!(target: "session.tracker", id = %id, "evicting session on trim");
				on_evict(&id);
			}
		}
	}

	/// Drops everything without eviction callbacks.
	pub fn clear(&mut self) {
		self.ids.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn collect(tracker: &OpenSessionTracker) -> Vec<&str> {
		tracker.iter().collect()
	}

	#[test]
	fn select_moves_existing_id_to_front_without_duplicating() {
		let mut tracker = OpenSessionTracker::new(6);
		for id in ["a", "b", "c", "a", "b", "c", "b"] {
			tracker.select(id, |_| panic!("no eviction expected"));
		}

		assert_eq!(collect(&tracker), vec!["b", "c", "a"]);
	}

	#[test]
	fn reselecting_front_is_a_no_op() {
		let mut tracker = OpenSessionTracker::new(2);
		tracker.select("a", |_| {});
		tracker.select("a", |_| panic!("no eviction expected"));

		assert_eq!(collect(&tracker), vec!["a"]);
	}

	#[test]
	fn select_evicts_from_the_back_beyond_the_bound() {
		let mut evicted = Vec::new();
		let mut tracker = OpenSessionTracker::new(2);
		for id in ["a", "b", "c"] {
			tracker.select(id, |id| evicted.push(id.to_string()));
		}

		assert_eq!(collect(&tracker), vec!["c", "b"]);
		assert_eq!(evicted, vec!["a"]);

		tracker.select("a", |id| evicted.push(id.to_string()));
		assert_eq!(collect(&tracker), vec!["a", "c"]);
		assert_eq!(evicted, vec!["a", "b"]);
	}

	#[test]
	fn remove_never_fires_eviction() {
		let mut tracker = OpenSessionTracker::new(2);
		tracker.select("a", |_| {});
		tracker.select("b", |_| {});

		tracker.remove("a");
		tracker.remove("missing");

		assert_eq!(collect(&tracker), vec!["b"]);
	}

	#[test]
	fn trim_to_selected_keeps_only_the_given_id() {
		let mut evicted = Vec::new();
		let mut tracker = OpenSessionTracker::new(6);
		for id in ["a", "b", "c", "d"] {
			tracker.select(id, |_| {});
		}

		tracker.trim_to_selected("c", |id| evicted.push(id.to_string()));

		assert_eq!(collect(&tracker), vec!["c"]);
		assert_eq!(evicted, vec!["d", "b", "a"]);
	}

	#[test]
	fn trim_to_absent_id_empties_the_tracker() {
		let mut evicted = Vec::new();
		let mut tracker = OpenSessionTracker::new(6);
		tracker.select("a", |_| {});
		tracker.select("b", |_| {});

		tracker.trim_to_selected("missing", |id| evicted.push(id.to_string()));

		assert!(tracker.is_empty());
		assert_eq!(evicted, vec!["b", "a"]);
	}

	#[test]
	fn bound_is_clamped_to_at_least_one() {
		let mut tracker = OpenSessionTracker::new(0);
		tracker.select("a", |_| panic!("no eviction expected"));
		assert_eq!(tracker.max_open(), 1);
		assert_eq!(collect(&tracker), vec!["a"]);
	}
}
