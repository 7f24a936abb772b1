//! Session observation.
//!
//! `SessionProvider` reconciles an initial fetch of any persisted session
//! against the live event stream, so a stale persisted session is never
//! trusted once a sign-out event has been observed. `SessionEvents` is the
//! in-process hub the auth handlers publish lifecycle events through.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use immogest_types::session::{SessionBackend, SessionEvent, SessionState};

use crate::prelude::*;

// SessionEvents //
//***************//
/// Fan-out hub for session lifecycle events.
///
/// Each subscriber gets its own channel; disconnected subscribers are
/// pruned on the next emit.
#[derive(Debug, Default)]
pub struct SessionEvents {
	subscribers: Mutex<Vec<flume::Sender<SessionEvent>>>,
}

impl SessionEvents {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn subscribe(&self) -> flume::Receiver<SessionEvent> {
		let (tx, rx) = flume::unbounded();
		self.subscribers.lock().push(tx);
		rx
	}

	pub fn emit(&self, event: &SessionEvent) {
		self.subscribers.lock().retain(|tx| tx.send(event.clone()).is_ok());
	}
}

// SessionProvider //
//*****************//
/// Reactive view of the current session.
///
/// The provider holds the single event subscription for its lifetime;
/// dropping it aborts the reconciliation task and releases the
/// subscription, so re-mounts never leak listeners.
pub struct SessionProvider {
	rx: watch::Receiver<SessionState>,
	task: JoinHandle<()>,
}

impl SessionProvider {
	pub fn spawn(backend: Arc<dyn SessionBackend>) -> Self {
		// Subscribe before the initial fetch so no event can slip between
		let events = backend.subscribe();
		let (tx, rx) = watch::channel(SessionState::Loading);

		let task = tokio::spawn(async move {
			let fetch = backend.current_session();
			tokio::pin!(fetch);
			let mut fetch_pending = true;
			// Set once any state has been published; a later initial-fetch
			// result must not override it
			let mut settled = false;

			loop {
				tokio::select! {
					res = &mut fetch, if fetch_pending => {
						fetch_pending = false;
						if settled {
							debug!("Discarding stale initial session fetch");
							continue;
						}
						settled = true;
						match res {
							Ok(Some(identity)) => {
								let _ = tx.send(SessionState::Present(identity));
							}
							Ok(None) => {
								let _ = tx.send(SessionState::Absent);
								// Clear residual credential state so a dead
								// session cannot silently resume
								if let Err(err) = backend.sign_out().await {
									warn!("Failed to clear residual session: {}", err);
								}
							}
							Err(err) => {
								warn!("Session fetch failed: {}", err);
								let _ = tx.send(SessionState::Absent);
							}
						}
					}
					event = events.recv_async() => {
						let Ok(event) = event else { break };
						settled = true;
						let state = match event {
							SessionEvent::SignedIn(identity)
							| SessionEvent::TokenRefreshed(identity) => {
								SessionState::Present(identity)
							}
							SessionEvent::SignedOut => SessionState::Absent,
						};
						if tx.send(state).is_err() {
							break;
						}
					}
				}
			}
			debug!("Session provider task finished");
		});

		Self { rx, task }
	}

	/// Current state, without waiting
	pub fn state(&self) -> SessionState {
		self.rx.borrow().clone()
	}

	/// Observe state changes
	pub fn watch(&self) -> watch::Receiver<SessionState> {
		self.rx.clone()
	}
}

impl Drop for SessionProvider {
	fn drop(&mut self) {
		self.task.abort();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use immogest_types::tenant_adapter::{Identity, Role};
	use std::sync::atomic::{AtomicBool, Ordering};
	use std::time::Duration;

	fn alice() -> Identity {
		Identity {
			user_id: "U2".into(),
			email: Some("alice@example.com".into()),
			role: Role::Proprietor,
			must_change_password: false,
		}
	}

	/// Backend with a controllable initial fetch and event stream
	#[derive(Debug)]
	struct MockBackend {
		initial: Option<Identity>,
		fetch_delay: Duration,
		events_tx: flume::Sender<SessionEvent>,
		events_rx: flume::Receiver<SessionEvent>,
		signed_out: AtomicBool,
	}

	impl MockBackend {
		fn new(initial: Option<Identity>, fetch_delay: Duration) -> Arc<Self> {
			let (events_tx, events_rx) = flume::unbounded();
			Arc::new(Self {
				initial,
				fetch_delay,
				events_tx,
				events_rx,
				signed_out: AtomicBool::new(false),
			})
		}
	}

	#[async_trait]
	impl SessionBackend for MockBackend {
		async fn current_session(&self) -> IgResult<Option<Identity>> {
			tokio::time::sleep(self.fetch_delay).await;
			Ok(self.initial.clone())
		}

		fn subscribe(&self) -> flume::Receiver<SessionEvent> {
			self.events_rx.clone()
		}

		async fn sign_out(&self) -> IgResult<()> {
			self.signed_out.store(true, Ordering::SeqCst);
			Ok(())
		}
	}

	async fn settled_state(provider: &SessionProvider) -> SessionState {
		let mut rx = provider.watch();
		while rx.borrow().is_loading() {
			rx.changed().await.unwrap();
		}
		let state = rx.borrow().clone();
		state
	}

	#[tokio::test]
	async fn test_initial_fetch_present() {
		let backend = MockBackend::new(Some(alice()), Duration::ZERO);
		let provider = SessionProvider::spawn(backend);
		assert_eq!(settled_state(&provider).await, SessionState::Present(alice()));
	}

	#[tokio::test]
	async fn test_empty_initial_fetch_clears_residual_credentials() {
		let backend = MockBackend::new(None, Duration::ZERO);
		let provider = SessionProvider::spawn(backend.clone());
		assert_eq!(settled_state(&provider).await, SessionState::Absent);

		// The proactive sign-out fires after the state is published
		tokio::time::sleep(Duration::from_millis(10)).await;
		assert!(backend.signed_out.load(Ordering::SeqCst));
	}

	#[tokio::test]
	async fn test_sign_out_event_beats_stale_persisted_session() {
		// A persisted session arrives slowly; a sign-out event lands first
		let backend = MockBackend::new(Some(alice()), Duration::from_millis(50));
		let provider = SessionProvider::spawn(backend.clone());

		backend.events_tx.send(SessionEvent::SignedOut).unwrap();
		assert_eq!(settled_state(&provider).await, SessionState::Absent);

		// The late fetch result must not resurrect the session
		tokio::time::sleep(Duration::from_millis(80)).await;
		assert_eq!(provider.state(), SessionState::Absent);
	}

	#[tokio::test]
	async fn test_events_update_state_after_settle() {
		let backend = MockBackend::new(None, Duration::ZERO);
		let provider = SessionProvider::spawn(backend.clone());
		assert_eq!(settled_state(&provider).await, SessionState::Absent);

		let mut rx = provider.watch();
		backend.events_tx.send(SessionEvent::SignedIn(alice())).unwrap();
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow(), SessionState::Present(alice()));

		backend.events_tx.send(SessionEvent::SignedOut).unwrap();
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow(), SessionState::Absent);
	}

	#[tokio::test]
	async fn test_events_hub_fans_out_and_prunes() {
		let hub = SessionEvents::new();
		let rx1 = hub.subscribe();
		let rx2 = hub.subscribe();

		hub.emit(&SessionEvent::SignedOut);
		assert_eq!(rx1.recv().unwrap(), SessionEvent::SignedOut);
		assert_eq!(rx2.recv().unwrap(), SessionEvent::SignedOut);

		drop(rx1);
		hub.emit(&SessionEvent::SignedOut);
		assert_eq!(hub.subscribers.lock().len(), 1);
	}
}

// vim: ts=4
