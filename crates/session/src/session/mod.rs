//! [`Session`] value type representing one browsing tab.
//!
//! A session is pure state plus change notification: no operation here can
//! fail and no engine calls happen here. Engine resources are linked to
//! sessions by the manager, not held by the session itself.

use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

/// A value type holding security information for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityInfo {
	/// True if the session currently points at a URL with a valid
	/// certificate.
	pub secure: bool,
	/// Domain the certificate was issued for.
	pub host: String,
	/// Name of the certificate authority that issued the certificate.
	pub issuer: String,
}

/// Configuration marking a session as a custom tab.
///
/// Presence of this config excludes the session from regular tab
/// bookkeeping: it is never auto-selected and survives bulk removal of
/// regular sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTabConfig {
	/// Toolbar color requested by the launching app (ARGB).
	pub toolbar_color: Option<u32>,
	/// Whether the close button is shown.
	pub show_close_button: bool,
}

impl Default for CustomTabConfig {
	fn default() -> Self {
		Self {
			toolbar_color: None,
			show_close_button: true,
		}
	}
}

/// Interface to be implemented by classes that want to observe a session.
///
/// All methods default to no-ops so implementors only override what they
/// care about. Notifications run synchronously on the calling thread.
pub trait SessionObserver {
	fn on_url_changed(&self, _session: &Session, _url: &str) {}
	fn on_title_changed(&self, _session: &Session, _title: &str) {}
	fn on_progress(&self, _session: &Session, _progress: u8) {}
	fn on_loading_state_changed(&self, _session: &Session, _loading: bool) {}
	fn on_navigation_state_changed(&self, _session: &Session, _can_go_back: bool, _can_go_forward: bool) {}
	fn on_search(&self, _session: &Session, _search_terms: &str) {}
	fn on_security_changed(&self, _session: &Session, _security_info: &SecurityInfo) {}
}

/// The state of one browsing tab. Changes can be observed.
///
/// Property setters compare old and new values and notify registered
/// observers only when the value actually changed (except search terms,
/// which re-notify so repeated searches for the same terms are visible).
pub struct Session {
	id: String,
	url: String,
	private: bool,
	context_id: Option<String>,
	parent_id: Option<String>,
	custom_tab_config: Option<CustomTabConfig>,
	last_access: i64,
	title: String,
	progress: u8,
	loading: bool,
	can_go_back: bool,
	can_go_forward: bool,
	search_terms: String,
	security_info: SecurityInfo,
	observers: Vec<Rc<dyn SessionObserver>>,
}

impl Session {
	/// Creates a regular session with a fresh id.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			url: url.into(),
			private: false,
			context_id: None,
			parent_id: None,
			custom_tab_config: None,
			last_access: 0,
			title: String::new(),
			progress: 0,
			loading: false,
			can_go_back: false,
			can_go_forward: false,
			search_terms: String::new(),
			security_info: SecurityInfo::default(),
			observers: Vec::new(),
		}
	}

	/// Replaces the autogenerated id. Intended for restore paths that must
	/// reproduce a previously persisted session.
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = id.into();
		self
	}

	pub fn with_private(mut self, private: bool) -> Self {
		self.private = private;
		self
	}

	pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
		self.context_id = Some(context_id.into());
		self
	}

	pub fn with_custom_tab_config(mut self, config: CustomTabConfig) -> Self {
		self.custom_tab_config = Some(config);
		self
	}

	/// Sets the parent link directly. Intended for restore paths that
	/// rebuild persisted sessions; the session manager validates parent
	/// links on restore and manages them afterwards.
	pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
		self.parent_id = Some(parent_id.into());
		self
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Whether this is a private-browsing session. Immutable.
	pub fn is_private(&self) -> bool {
		self.private
	}

	/// Storage container tag partitioning sessions, if any. Immutable.
	pub fn context_id(&self) -> Option<&str> {
		self.context_id.as_deref()
	}

	/// Id of the session this one was opened from, if any.
	pub fn parent_id(&self) -> Option<&str> {
		self.parent_id.as_deref()
	}

	pub fn custom_tab_config(&self) -> Option<&CustomTabConfig> {
		self.custom_tab_config.as_ref()
	}

	/// Returns whether this session is used for a custom tab.
	pub fn is_custom_tab(&self) -> bool {
		self.custom_tab_config.is_some()
	}

	pub fn last_access(&self) -> i64 {
		self.last_access
	}

	/// Updates the last-access timestamp (millis). No notification.
	pub fn set_last_access(&mut self, last_access: i64) {
		self.last_access = last_access;
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn progress(&self) -> u8 {
		self.progress
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}

	pub fn can_go_back(&self) -> bool {
		self.can_go_back
	}

	pub fn can_go_forward(&self) -> bool {
		self.can_go_forward
	}

	pub fn search_terms(&self) -> &str {
		&self.search_terms
	}

	pub fn security_info(&self) -> &SecurityInfo {
		&self.security_info
	}

	// The parent link is managed by the session manager to preserve the
	// insertion-order invariants; external callers cannot set it.
	pub(crate) fn set_parent_id(&mut self, parent_id: Option<String>) {
		self.parent_id = parent_id;
	}

	/// The currently loading or loaded URL.
	pub fn set_url(&mut self, url: impl Into<String>) {
		let url = url.into();
		if self.url == url {
			return;
		}
		self.url = url;
		self.notify(|observer, session| observer.on_url_changed(session, &session.url));
	}

	/// The title of the currently displayed page.
	pub fn set_title(&mut self, title: impl Into<String>) {
		let title = title.into();
		if self.title == title {
			return;
		}
		self.title = title;
		self.notify(|observer, session| observer.on_title_changed(session, &session.title));
	}

	/// Load progress of the current URL, in percent.
	pub fn set_progress(&mut self, progress: u8) {
		if self.progress == progress {
			return;
		}
		self.progress = progress;
		self.notify(|observer, session| observer.on_progress(session, session.progress));
	}

	/// True while this session's URL is loading.
	pub fn set_loading(&mut self, loading: bool) {
		if self.loading == loading {
			return;
		}
		self.loading = loading;
		self.notify(|observer, session| observer.on_loading_state_changed(session, session.loading));
	}

	/// True if there is a history item to go back to.
	pub fn set_can_go_back(&mut self, can_go_back: bool) {
		if self.can_go_back == can_go_back {
			return;
		}
		self.can_go_back = can_go_back;
		self.notify(|observer, session| {
			observer.on_navigation_state_changed(session, session.can_go_back, session.can_go_forward)
		});
	}

	/// True if there is a history item to go forward to.
	pub fn set_can_go_forward(&mut self, can_go_forward: bool) {
		if self.can_go_forward == can_go_forward {
			return;
		}
		self.can_go_forward = can_go_forward;
		self.notify(|observer, session| {
			observer.on_navigation_state_changed(session, session.can_go_back, session.can_go_forward)
		});
	}

	/// The currently / last used search terms. Always notifies, so repeated
	/// searches for the same terms are observable.
	pub fn set_search_terms(&mut self, search_terms: impl Into<String>) {
		self.search_terms = search_terms.into();
		self.notify(|observer, session| observer.on_search(session, &session.search_terms));
	}

	/// Security information for the currently loaded URL.
	pub fn set_security_info(&mut self, security_info: SecurityInfo) {
		if self.security_info == security_info {
			return;
		}
		self.security_info = security_info;
		self.notify(|observer, session| observer.on_security_changed(session, &session.security_info));
	}

	/// Registers an observer. Observers are held strongly until
	/// unregistered.
	pub fn register(&mut self, observer: Rc<dyn SessionObserver>) {
		self.observers.push(observer);
	}

	/// Unregisters an observer by pointer identity.
	pub fn unregister(&mut self, observer: &Rc<dyn SessionObserver>) {
		self.observers.retain(|existing| !Rc::ptr_eq(existing, observer));
	}

	fn notify<F: Fn(&dyn SessionObserver, &Session)>(&self, callback: F) {
		for observer in &self.observers {
			callback(observer.as_ref(), self);
		}
	}
}

impl Clone for Session {
	// Observer registrations stay with the original; clones start with an
	// empty observer list.
	fn clone(&self) -> Self {
		Self {
			id: self.id.clone(),
			url: self.url.clone(),
			private: self.private,
			context_id: self.context_id.clone(),
			parent_id: self.parent_id.clone(),
			custom_tab_config: self.custom_tab_config.clone(),
			last_access: self.last_access,
			title: self.title.clone(),
			progress: self.progress,
			loading: self.loading,
			can_go_back: self.can_go_back,
			can_go_forward: self.can_go_forward,
			search_terms: self.search_terms.clone(),
			security_info: self.security_info.clone(),
			observers: Vec::new(),
		}
	}
}

impl PartialEq for Session {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for Session {}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("id", &self.id)
			.field("url", &self.url)
			.field("private", &self.private)
			.finish_non_exhaustive()
	}
}

impl fmt::Display for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Session({}, {})", self.id, self.url)
	}
}
