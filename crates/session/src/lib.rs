//! Engine-agnostic browser session (tab) lifecycle management.
//!
//! The centerpiece is [`SessionManager`]: it owns the ordered collection of
//! [`Session`] values, the selection pointer, parent/child relationships,
//! and the bounded open set of sessions with a warm engine resource. Engine
//! access goes through the abstract capability in the `engine` crate; the
//! manager never blocks on it.
//!
//! Everything here is synchronous and single-threaded by contract. Callers
//! invoking the manager from multiple threads must serialize access
//! themselves; in exchange there is no internal locking and observer
//! callbacks run inline on the calling thread.

mod error;
mod manager;
mod session;
mod snapshot;
mod tracker;

pub use error::{Error, Result};
pub use manager::{AddOptions, ResourceId, SessionManager, SessionManagerObserver};
pub use session::{CustomTabConfig, SecurityInfo, Session, SessionObserver};
pub use snapshot::{Snapshot, SnapshotItem};
pub use tracker::{DEFAULT_MAX_OPEN_SESSIONS, OpenSessionTracker};
