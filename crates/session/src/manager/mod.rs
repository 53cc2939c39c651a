//! Centralized registry of all active sessions.

mod selection;

use std::collections::HashSet;
use std::rc::Rc;

use engine::{Engine, EngineSession, EngineSessionState};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::session::Session;
use crate::snapshot::{Snapshot, SnapshotItem};
use crate::tracker::{DEFAULT_MAX_OPEN_SESSIONS, OpenSessionTracker};

/// Opaque handle identifying a linked engine resource. Ids are unique for
/// the lifetime of a manager and never reused, so a stale id held after
/// unlinking simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

/// Interface to be implemented by classes that want to observe the
/// session manager. All methods have empty default implementations.
pub trait SessionManagerObserver {
	fn on_session_added(&self, _session: &Session) {}
	fn on_session_removed(&self, _session: &Session) {}
	fn on_session_selected(&self, _session: &Session) {}
	/// A batch of sessions was added or restored, passed in insertion
	/// order. No per-session `on_session_added` calls accompany this.
	fn on_sessions_restored(&self, _sessions: &[Session]) {}
	fn on_all_sessions_removed(&self) {}
}

/// Options for [`SessionManager::add_with`].
#[derive(Default)]
pub struct AddOptions {
	/// Whether the new session should be selected immediately.
	pub selected: bool,
	/// Id of the session that opened the new one, if any. The new session
	/// is inserted after the parent's contiguous block of descendants.
	pub parent_id: Option<String>,
	/// An already existing engine session to link to the new session.
	pub engine_session: Option<Box<dyn EngineSession>>,
}

struct EngineSessionLink {
	resource_id: ResourceId,
	handle: Box<dyn EngineSession>,
}

/// Buffered observer notification. Notifications are collected while a
/// mutation runs and dispatched afterwards, so observers always see the
/// manager in a consistent state.
enum Notification {
	Added(Session),
	Removed(Session),
	Selected(Session),
	Restored(Vec<Session>),
	AllRemoved,
}

/// Keeps track of all active sessions, the selected session and the
/// engine sessions linked to them.
///
/// Not thread safe by design: all calls are expected to happen on the
/// same thread, matching the single-threaded ownership model of the
/// embedding application.
pub struct SessionManager {
	engine: Rc<dyn Engine>,
	values: Vec<Session>,
	selected_index: Option<usize>,
	links: IndexMap<String, EngineSessionLink>,
	resource_ids: IndexMap<ResourceId, String>,
	next_resource_id: u64,
	restored_state: IndexMap<String, EngineSessionState>,
	open_sessions: OpenSessionTracker,
	observers: Vec<Rc<dyn SessionManagerObserver>>,
}

impl SessionManager {
	pub fn new(engine: Rc<dyn Engine>) -> Self {
		Self::with_max_open_sessions(engine, DEFAULT_MAX_OPEN_SESSIONS)
	}

	/// Creates a manager keeping at most `max_open_sessions` engine
	/// sessions warm at the same time.
	pub fn with_max_open_sessions(engine: Rc<dyn Engine>, max_open_sessions: usize) -> Self {
		Self {
			engine,
			values: Vec::new(),
			selected_index: None,
			links: IndexMap::new(),
			resource_ids: IndexMap::new(),
			next_resource_id: 0,
			restored_state: IndexMap::new(),
			open_sessions: OpenSessionTracker::new(max_open_sessions),
			observers: Vec::new(),
		}
	}

	/// Number of sessions, including custom tab sessions.
	pub fn size(&self) -> usize {
		self.values.len()
	}

	/// All sessions in order, excluding custom tab sessions.
	pub fn sessions(&self) -> Vec<&Session> {
		self.values.iter().filter(|session| !session.is_custom_tab()).collect()
	}

	/// All sessions in order, including custom tab sessions.
	pub fn all(&self) -> &[Session] {
		&self.values
	}

	pub fn selected_session(&self) -> Option<&Session> {
		self.selected_index.map(|index| &self.values[index])
	}

	pub fn find_session_by_id(&self, id: &str) -> Option<&Session> {
		self.index_of(id).map(|index| &self.values[index])
	}

	/// The recently-used tracker deciding which engine sessions stay warm.
	pub fn open_sessions(&self) -> &OpenSessionTracker {
		&self.open_sessions
	}

	pub fn register(&mut self, observer: Rc<dyn SessionManagerObserver>) {
		self.observers.push(observer);
	}

	pub fn unregister(&mut self, observer: &Rc<dyn SessionManagerObserver>) {
		self.observers.retain(|existing| !Rc::ptr_eq(existing, observer));
	}

	/// Adds the provided session with default options.
	pub fn add(&mut self, session: Session) -> Result<()> {
		self.add_with(session, AddOptions::default())
	}

	/// Adds the provided session.
	///
	/// The first non-custom-tab session added to an empty manager is
	/// selected automatically. Custom tab sessions are never selected.
	pub fn add_with(&mut self, mut session: Session, options: AddOptions) -> Result<()> {
		if self.index_of(session.id()).is_some() {
			return Err(Error::DuplicateSession { id: session.id().to_string() });
		}

		let insert_index = match options.parent_id.as_deref() {
			Some(parent_id) => {
				let parent_index = self
					.index_of(parent_id)
					.ok_or_else(|| Error::UnknownParent { id: parent_id.to_string() })?;
				session.set_parent_id(Some(parent_id.to_string()));
				self.end_of_descendant_block(parent_index)
			}
			None => self.values.len(),
		};

		let id = session.id().to_string();
		debug!(target: "session.manager", id = %id, index = insert_index, "session added");

		self.values.insert(insert_index, session);
		if let Some(selected) = self.selected_index {
			if insert_index <= selected {
				self.selected_index = Some(selected + 1);
			}
		}

		if let Some(handle) = options.engine_session {
			self.link(insert_index, handle);
			self.warm_open_set(&id);
		}

		let mut notifications = vec![Notification::Added(self.values[insert_index].clone())];

		let is_custom_tab = self.values[insert_index].is_custom_tab();
		if is_custom_tab {
			if options.selected {
				warn!(target: "session.manager", id = %id, "refusing to select custom tab session");
			}
		} else if options.selected || self.selected_index.is_none() {
			self.select_at(insert_index, &mut notifications);
		}

		self.dispatch(notifications);
		Ok(())
	}

	/// Adds multiple sessions in one batch, appended in iteration order.
	///
	/// Fails atomically if any session is a custom tab, carries a parent
	/// or duplicates a tracked id. Observers receive a single
	/// `on_sessions_restored` call instead of per-session notifications.
	pub fn add_all(&mut self, sessions: Vec<Session>) -> Result<()> {
		let mut incoming: HashSet<&str> = HashSet::new();
		for session in &sessions {
			let id = session.id();
			if session.is_custom_tab() {
				return Err(Error::CustomTabInBatch { id: id.to_string() });
			}
			if session.parent_id().is_some() {
				return Err(Error::ParentedSessionInBatch { id: id.to_string() });
			}
			if self.index_of(id).is_some() || !incoming.insert(id) {
				return Err(Error::DuplicateSession { id: id.to_string() });
			}
		}

		if sessions.is_empty() {
			return Ok(());
		}

		let first_index = self.values.len();
		let to_select = if self.selected_index.is_none() {
			sessions.iter().position(|session| !session.is_private())
		} else {
			None
		};

		debug!(target: "session.manager", count = sessions.len(), "sessions added in batch");
		let batch = sessions.clone();
		self.values.extend(sessions);

		let mut notifications = vec![Notification::Restored(batch)];
		if let Some(offset) = to_select {
			self.select_at(first_index + offset, &mut notifications);
		}
		self.dispatch(notifications);
		Ok(())
	}

	/// Marks the given session as selected.
	///
	/// Re-selecting the already selected session is allowed and notifies
	/// observers again. Selecting a custom tab session is refused and
	/// leaves the selection unchanged.
	pub fn select(&mut self, id: &str) -> Result<()> {
		let index = self
			.index_of(id)
			.ok_or_else(|| Error::UnknownSession { id: id.to_string() })?;

		let mut notifications = Vec::new();
		self.select_at(index, &mut notifications);
		self.dispatch(notifications);
		Ok(())
	}

	/// Removes the given session, if tracked. Removing an untracked id
	/// is a no-op.
	///
	/// If the removed session was selected a new selection is computed:
	/// the parent wins when `select_parent_if_exists` is set, otherwise
	/// the nearest session with the same privacy flag. Direct children of
	/// the removed session are re-parented to its parent.
	pub fn remove(&mut self, id: &str, select_parent_if_exists: bool) -> Result<()> {
		let Some(index) = self.index_of(id) else {
			debug!(target: "session.manager", id = %id, "ignoring removal of untracked session");
			return Ok(());
		};

		let previously_selected = self.selected_session().map(|session| session.id().to_string());

		let removed = self.values.remove(index);
		let new_selection = match selection::recalculate(
			&self.values,
			self.selected_index,
			index,
			&removed,
			select_parent_if_exists,
		) {
			Ok(new_selection) => new_selection,
			Err(err) => {
				// Leave the manager untouched on failure.
				self.values.insert(index, removed);
				return Err(err);
			}
		};

		let removed_id = removed.id().to_string();
		debug!(target: "session.manager", id = %removed_id, "session removed");

		self.unlink(&removed_id);
		self.open_sessions.remove(&removed_id);
		self.restored_state.shift_remove(&removed_id);

		// Direct children move up one level; their positions already sit
		// where the removed session's block was, so only ids change.
		let grandparent = removed.parent_id().map(str::to_string);
		for child in &mut self.values {
			if child.parent_id() == Some(removed_id.as_str()) {
				child.set_parent_id(grandparent.clone());
			}
		}

		self.selected_index = new_selection;

		let mut notifications = vec![Notification::Removed(removed)];

		let newly_selected = new_selection.map(|i| self.values[i].id().to_string());
		if newly_selected != previously_selected {
			if let Some(new_index) = new_selection {
				self.select_at(new_index, &mut notifications);
			}
		}

		self.dispatch(notifications);
		Ok(())
	}

	/// Removes all regular sessions. Custom tab sessions and their engine
	/// links are kept.
	pub fn remove_sessions(&mut self) {
		debug!(target: "session.manager", "removing all regular sessions");

		let values = std::mem::take(&mut self.values);
		let (custom_tabs, regular): (Vec<_>, Vec<_>) =
			values.into_iter().partition(|session| session.is_custom_tab());

		for session in &regular {
			let id = session.id().to_string();
			self.unlink(&id);
			self.open_sessions.remove(&id);
			self.restored_state.shift_remove(&id);
		}

		self.values = custom_tabs;
		// The selected session is never a custom tab, so it was removed.
		self.selected_index = None;

		self.dispatch(vec![Notification::AllRemoved]);
	}

	/// Removes all sessions, including custom tab sessions.
	pub fn remove_all(&mut self) {
		debug!(target: "session.manager", "removing all sessions");

		let ids: Vec<String> = self.values.iter().map(|session| session.id().to_string()).collect();
		for id in &ids {
			self.unlink(id);
		}

		self.values.clear();
		self.selected_index = None;
		self.open_sessions.clear();
		self.restored_state.clear();

		self.dispatch(vec![Notification::AllRemoved]);
	}

	/// Restores sessions from the given snapshot, appending them after
	/// the existing sessions.
	///
	/// An empty snapshot is a no-op. Duplicate ids fail the whole call
	/// before any state changes. Parent links are kept only when the
	/// parent is part of the same snapshot. With `update_selection` set,
	/// the snapshot's selection index is applied when it is in bounds;
	/// an out-of-bounds index keeps the current selection.
	pub fn restore(&mut self, snapshot: Snapshot, update_selection: bool) -> Result<()> {
		if snapshot.is_empty() {
			debug!(target: "session.manager", "ignoring restore of empty snapshot");
			return Ok(());
		}

		let mut incoming: HashSet<String> = HashSet::new();
		for item in &snapshot.items {
			let id = item.session.id();
			if self.index_of(id).is_some() || !incoming.insert(id.to_string()) {
				return Err(Error::DuplicateSession { id: id.to_string() });
			}
		}

		let first_index = self.values.len();
		let count = snapshot.items.len();
		let snapshot_selection = snapshot.selected_index;

		debug!(target: "session.manager", count, "restoring sessions from snapshot");

		for item in snapshot.items {
			let mut session = item.session;
			session.set_last_access(item.last_access);

			if let Some(parent_id) = session.parent_id().map(str::to_string) {
				if !incoming.contains(&parent_id) {
					session.set_parent_id(None);
				}
			}

			if let Some(state) = item.engine_state {
				self.restored_state.insert(session.id().to_string(), state);
			}

			self.values.push(session);
		}

		let restored = self.values[first_index..].to_vec();
		let mut notifications = vec![Notification::Restored(restored)];
		if update_selection {
			if let Some(index) = snapshot_selection {
				if index < count {
					self.select_at(first_index + index, &mut notifications);
				} else {
					warn!(
						target: "session.manager",
						index,
						"restored selection index out of bounds, keeping current selection"
					);
				}
			}
		}

		self.dispatch(notifications);
		Ok(())
	}

	/// Creates a snapshot of all regular, non-private sessions, suitable
	/// for persisting. Returns `None` when nothing is worth persisting.
	pub fn create_snapshot(&self) -> Option<Snapshot> {
		let selected_id = self
			.selected_session()
			.filter(|session| !session.is_private())
			.map(|session| session.id().to_string());

		let mut items = Vec::new();
		let mut selected_index = None;

		for session in &self.values {
			if session.is_custom_tab() || session.is_private() {
				continue;
			}
			if selected_id.as_deref() == Some(session.id()) {
				selected_index = Some(items.len());
			}
			items.push(self.snapshot_item(session));
		}

		if items.is_empty() {
			return None;
		}

		// A private or absent selection falls back to the first item.
		Some(Snapshot::new(items, selected_index.or(Some(0))))
	}

	/// Creates a snapshot item of a single session.
	pub fn create_session_snapshot(&self, id: &str) -> Result<SnapshotItem> {
		let session = self
			.find_session_by_id(id)
			.ok_or_else(|| Error::UnknownSession { id: id.to_string() })?;
		Ok(self.snapshot_item(session))
	}

	fn snapshot_item(&self, session: &Session) -> SnapshotItem {
		// A live engine session wins over state still pending from an
		// earlier restore.
		let engine_state = self
			.links
			.get(session.id())
			.map(|link| link.handle.save_state())
			.or_else(|| self.restored_state.get(session.id()).cloned());

		SnapshotItem {
			session: session.clone(),
			engine_state,
			last_access: session.last_access(),
		}
	}

	/// The engine session linked to the given session, if any.
	pub fn get_engine_session(&self, id: &str) -> Option<&dyn EngineSession> {
		self.links.get(id).map(|link| link.handle.as_ref())
	}

	/// Returns the linked engine session, creating and linking one first
	/// if needed. Creating applies pending restored state before loading
	/// the session's URL.
	pub fn get_or_create_engine_session(&mut self, id: &str) -> Result<&mut dyn EngineSession> {
		let index = self
			.index_of(id)
			.ok_or_else(|| Error::UnknownSession { id: id.to_string() })?;

		if !self.links.contains_key(id) {
			debug!(target: "session.manager", id = %id, "creating engine session on demand");
			let handle = self.engine.create_session(self.values[index].is_private());
			self.link(index, handle);
			let owned = id.to_string();
			self.warm_open_set(&owned);
		}

		let link = self
			.links
			.get_mut(id)
			.ok_or_else(|| Error::InternalConsistency(format!("engine session link missing for {id}")))?;
		Ok(link.handle.as_mut())
	}

	/// The resource id of the engine session linked to `id`, if any.
	pub fn resource_id_for_session(&self, id: &str) -> Option<ResourceId> {
		self.links.get(id).map(|link| link.resource_id)
	}

	/// Reverse lookup from an engine resource to its session. Stale ids
	/// resolve to `None`.
	pub fn session_id_for_resource(&self, resource_id: ResourceId) -> Option<&str> {
		self.resource_ids.get(&resource_id).map(String::as_str)
	}

	/// Releases all engine sessions except the selected one's. Called by
	/// the embedding application under memory pressure.
	pub fn on_low_memory(&mut self) {
		debug!(target: "session.manager", "trimming engine sessions on low memory");

		let keep = self.selected_session().map(|session| session.id().to_string());
		let links = &mut self.links;

		match keep {
			Some(keep) => {
				self.open_sessions.trim_to_selected(&keep, |evicted| {
					if let Some(link) = links.get_mut(evicted) {
						link.handle.request_close();
					}
				});
			}
			None => {
				for id in self.open_sessions.iter() {
					if let Some(link) = links.get_mut(id) {
						link.handle.request_close();
					}
				}
				self.open_sessions.clear();
			}
		}
	}

	fn index_of(&self, id: &str) -> Option<usize> {
		self.values.iter().position(|session| session.id() == id)
	}

	/// First index after the contiguous block of `parent_index`'s
	/// descendants. New children are inserted there so a parent and its
	/// subtree stay adjacent.
	fn end_of_descendant_block(&self, parent_index: usize) -> usize {
		let mut block: HashSet<&str> = HashSet::new();
		block.insert(self.values[parent_index].id());

		let mut index = parent_index + 1;
		while index < self.values.len() {
			match self.values[index].parent_id() {
				Some(parent) if block.contains(parent) => {
					block.insert(self.values[index].id());
					index += 1;
				}
				_ => break,
			}
		}
		index
	}

	// The selected session is never a custom tab; every selection path
	// funnels through here.
	fn select_at(&mut self, index: usize, notifications: &mut Vec<Notification>) {
		if self.values[index].is_custom_tab() {
			warn!(
				target: "session.manager",
				id = %self.values[index].id(),
				"refusing to select custom tab session"
			);
			return;
		}

		self.selected_index = Some(index);
		let id = self.values[index].id().to_string();
		debug!(target: "session.manager", id = %id, "session selected");
		self.warm_open_set(&id);
		notifications.push(Notification::Selected(self.values[index].clone()));
	}

	/// Promotes `id` in the open-set tracker, closing the engine sessions
	/// of any evicted ids.
	fn warm_open_set(&mut self, id: &str) {
		let links = &mut self.links;
		self.open_sessions.select(id, |evicted| {
			if let Some(link) = links.get_mut(evicted) {
				link.handle.request_close();
			}
		});
	}

	/// Links an engine session to the session at `session_index`,
	/// replacing any existing link. Pending restored state is applied
	/// before the session's URL is loaded.
	fn link(&mut self, session_index: usize, mut handle: Box<dyn EngineSession>) {
		let id = self.values[session_index].id().to_string();
		self.unlink(&id);

		if let Some(state) = self.restored_state.shift_remove(&id) {
			handle.restore_state(&state);
		}
		handle.load_url(self.values[session_index].url());

		let resource_id = ResourceId(self.next_resource_id);
		self.next_resource_id += 1;

		debug!(target: "session.manager", id = %id, resource = resource_id.0, "engine session linked");
		self.resource_ids.insert(resource_id, id.clone());
		self.links.insert(id, EngineSessionLink { resource_id, handle });
	}

	/// Drops the link for `id`, asking the engine session to close. The
	/// resource id becomes stale and is never reused.
	fn unlink(&mut self, id: &str) {
		if let Some(mut link) = self.links.shift_remove(id) {
			debug!(target: "session.manager", id = %id, "engine session unlinked");
			link.handle.request_close();
			self.resource_ids.shift_remove(&link.resource_id);
		}
	}

	fn dispatch(&self, notifications: Vec<Notification>) {
		for notification in &notifications {
			for observer in &self.observers {
				match notification {
					Notification::Added(session) => observer.on_session_added(session),
					Notification::Removed(session) => observer.on_session_removed(session),
					Notification::Selected(session) => observer.on_session_selected(session),
					Notification::Restored(sessions) => observer.on_sessions_restored(sessions),
					Notification::AllRemoved => observer.on_all_sessions_removed(),
				}
			}
		}
	}
}

impl std::fmt::Debug for SessionManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionManager")
			.field("sessions", &self.values.len())
			.field("selected_index", &self.selected_index)
			.field("links", &self.links.len())
			.finish_non_exhaustive()
	}
}
