//! Session state and event types.
//!
//! A session binds an identity to a client context. Its lifecycle is
//! independent of any tenant: created on sign-in, destroyed on sign-out or
//! expiry, and observed reactively through `SessionState`.

use async_trait::async_trait;

use crate::prelude::*;
use crate::tenant_adapter::Identity;

/// Observable session state with an explicit loading phase.
///
/// `Loading` means the initial fetch has not settled yet; the guard must
/// not produce a decision while either input is still loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
	Loading,
	Present(Identity),
	Absent,
}

impl SessionState {
	pub fn is_loading(&self) -> bool {
		matches!(self, SessionState::Loading)
	}

	pub fn identity(&self) -> Option<&Identity> {
		match self {
			SessionState::Present(identity) => Some(identity),
			_ => None,
		}
	}
}

/// Live session lifecycle events pushed by the identity layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	SignedIn(Identity),
	TokenRefreshed(Identity),
	SignedOut,
}

/// Source of session data for a `SessionProvider`.
///
/// `subscribe` hands out an event receiver; dropping the receiver is the
/// unsubscribe. `sign_out` clears any persisted credential state.
#[async_trait]
pub trait SessionBackend: Send + Sync {
	/// Fetches any persisted session
	async fn current_session(&self) -> IgResult<Option<Identity>>;

	/// Subscribes to live session events
	fn subscribe(&self) -> flume::Receiver<SessionEvent>;

	/// Discards persisted credentials
	async fn sign_out(&self) -> IgResult<()>;
}

// vim: ts=4
