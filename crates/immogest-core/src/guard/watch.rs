//! Reactive guard binding.
//!
//! Joins the tenant resolution, the session state, and the current path
//! into a continuously re-evaluated guard outcome. This is a join, not a
//! race: the output stays `ShowLoading` until both async inputs have left
//! their loading state at least once; whichever settles last determines
//! when real evaluation begins.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use immogest_types::session::SessionState;
use immogest_types::tenant_adapter::TenantData;

use crate::guard::decision::{GuardOutcome, ResolveState, evaluate};
use crate::prelude::*;

pub struct GuardBinding {
	rx: watch::Receiver<GuardOutcome>,
	task: JoinHandle<()>,
}

impl GuardBinding {
	/// Spawns the evaluation task. Re-evaluation triggers: navigation
	/// (path change), tenant refetch completion, and every session event.
	pub fn spawn(
		mut tenant_rx: watch::Receiver<ResolveState<TenantData>>,
		mut session_rx: watch::Receiver<SessionState>,
		mut path_rx: watch::Receiver<String>,
	) -> Self {
		let initial = evaluate(&tenant_rx.borrow(), &session_rx.borrow(), &path_rx.borrow());
		let (tx, rx) = watch::channel(initial);

		let task = tokio::spawn(async move {
			loop {
				let changed = tokio::select! {
					res = tenant_rx.changed() => res,
					res = session_rx.changed() => res,
					res = path_rx.changed() => res,
				};
				if changed.is_err() {
					// An input went away; the binding is being torn down
					break;
				}

				let outcome = evaluate(
					&tenant_rx.borrow_and_update(),
					&session_rx.borrow_and_update(),
					&path_rx.borrow_and_update(),
				);
				if tx.send(outcome).is_err() {
					break;
				}
			}
			debug!("Guard binding task finished");
		});

		Self { rx, task }
	}

	/// Current outcome, without waiting
	pub fn outcome(&self) -> GuardOutcome {
		self.rx.borrow().clone()
	}

	/// Observe outcome changes
	pub fn watch(&self) -> watch::Receiver<GuardOutcome> {
		self.rx.clone()
	}
}

impl Drop for GuardBinding {
	fn drop(&mut self) {
		self.task.abort();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use immogest_types::tenant_adapter::{Identity, Role, TenantFeatures};

	fn acme() -> TenantData {
		TenantData {
			tn_id: TnId(1),
			slug: "acme".into(),
			name: "Acme Immobilier".into(),
			owner_id: "U1".into(),
			active: true,
			features: TenantFeatures::default(),
			created_at: Timestamp(1700000000),
		}
	}

	fn owner() -> Identity {
		Identity {
			user_id: "U1".into(),
			email: None,
			role: Role::AgencyOwner,
			must_change_password: false,
		}
	}

	#[tokio::test]
	async fn test_stays_loading_until_both_inputs_settle() {
		let (tenant_tx, tenant_rx) = watch::channel(ResolveState::Loading);
		let (session_tx, session_rx) = watch::channel(SessionState::Loading);
		let (_path_tx, path_rx) = watch::channel("/acme/agency/dashboard".to_string());

		let binding = GuardBinding::spawn(tenant_rx, session_rx, path_rx);
		assert_eq!(binding.outcome(), GuardOutcome::ShowLoading);

		// Tenant settles first; the session is still pending
		tenant_tx.send(ResolveState::Ready(acme())).unwrap();
		let mut rx = binding.watch();
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow(), GuardOutcome::ShowLoading);

		// The join completes when the last input settles
		session_tx.send(SessionState::Present(owner())).unwrap();
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow(), GuardOutcome::Render);
	}

	#[tokio::test]
	async fn test_reevaluates_on_navigation() {
		let (_tenant_tx, tenant_rx) = watch::channel(ResolveState::Ready(acme()));
		let (_session_tx, session_rx) = watch::channel(SessionState::Absent);
		let (path_tx, path_rx) = watch::channel("/acme/listings".to_string());

		let binding = GuardBinding::spawn(tenant_rx, session_rx, path_rx);
		assert_eq!(binding.outcome(), GuardOutcome::Render);

		let mut rx = binding.watch();
		path_tx.send("/acme/agency/dashboard".to_string()).unwrap();
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow(), GuardOutcome::RedirectTo("/acme/agency/auth".into()));
	}

	#[tokio::test]
	async fn test_reevaluates_on_session_change() {
		let (_tenant_tx, tenant_rx) = watch::channel(ResolveState::Ready(acme()));
		let (session_tx, session_rx) = watch::channel(SessionState::Present(owner()));
		let (_path_tx, path_rx) = watch::channel("/acme/agency/dashboard".to_string());

		let binding = GuardBinding::spawn(tenant_rx, session_rx, path_rx);
		assert_eq!(binding.outcome(), GuardOutcome::Render);

		// Sign-out observed: the dashboard bounces to the sign-in page
		let mut rx = binding.watch();
		session_tx.send(SessionState::Absent).unwrap();
		rx.changed().await.unwrap();
		assert_eq!(*rx.borrow(), GuardOutcome::RedirectTo("/acme/agency/auth".into()));
	}
}

// vim: ts=4
