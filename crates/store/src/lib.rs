//! Observable projection of the session manager's state, plus the
//! persisted snapshot wire format.
//!
//! The data flow is strictly one-way: [`StoreBridge`] observes a
//! `SessionManager` and dispatches [`Action`]s into a [`BrowserStore`];
//! nothing in this crate mutates the manager. The store is internally
//! synchronized so consumers on other threads can read state, while the
//! manager itself stays single-threaded.

mod bridge;
mod error;
mod state;
mod store;

pub mod serialize;

pub use bridge::StoreBridge;
pub use error::{Error, Result};
pub use state::{Action, BrowserState, SessionState};
pub use store::BrowserStore;
