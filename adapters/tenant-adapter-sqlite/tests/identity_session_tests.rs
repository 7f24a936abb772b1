//! Integration tests - identities and sessions
//!
//! Covers credential checks, the forced-password-change flag, session
//! creation/expiry, and the compensation path (identity delete removes
//! its sessions).

use std::sync::Arc;
use tempfile::TempDir;

use immogest_tenant_adapter_sqlite::TenantAdapterSqlite;
use immogest::prelude::*;
use immogest::tenant_adapter::{CreateIdentityData, Role, TenantAdapter};
use immogest::worker::WorkerPool;

async fn create_test_adapter() -> IgResult<(TenantAdapterSqlite, TempDir)> {
	let tmp_dir = TempDir::new()?;
	let db_path = tmp_dir.path().join("tenants.db");
	let worker = Arc::new(WorkerPool::new(1));
	let adapter = TenantAdapterSqlite::new(worker, db_path).await?;
	Ok((adapter, tmp_dir))
}

async fn create_owner(adapter: &TenantAdapterSqlite) -> immogest::tenant_adapter::Identity {
	adapter
		.create_identity(CreateIdentityData {
			email: "owner@acme.fr",
			password: "initial-password",
			role: Role::AgencyOwner,
			must_change_password: true,
		})
		.await
		.unwrap()
}

#[tokio::test]
async fn test_create_identity_and_check_password() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let created = create_owner(&adapter).await;

	let identity = adapter.check_password("owner@acme.fr", "initial-password").await.unwrap();
	assert_eq!(identity.user_id, created.user_id);
	assert_eq!(identity.role, Role::AgencyOwner);
	assert!(identity.must_change_password);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_surface_the_same() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	create_owner(&adapter).await;

	let wrong = adapter.check_password("owner@acme.fr", "nope-nope-nope").await;
	let unknown = adapter.check_password("ghost@acme.fr", "initial-password").await;
	assert!(matches!(wrong, Err(Error::PermissionDenied)));
	assert!(matches!(unknown, Err(Error::PermissionDenied)));
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	create_owner(&adapter).await;

	let res = adapter
		.create_identity(CreateIdentityData {
			email: "owner@acme.fr",
			password: "another-password",
			role: Role::Client,
			must_change_password: false,
		})
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_update_password_clears_forced_change() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let created = create_owner(&adapter).await;

	adapter.update_password(&created.user_id, "brand-new-password").await.unwrap();

	let identity = adapter.check_password("owner@acme.fr", "brand-new-password").await.unwrap();
	assert!(!identity.must_change_password);

	// The old password no longer works
	let old = adapter.check_password("owner@acme.fr", "initial-password").await;
	assert!(matches!(old, Err(Error::PermissionDenied)));
}

#[tokio::test]
async fn test_reset_password_forces_change_on_next_login() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let created = create_owner(&adapter).await;

	// First login done, flag cleared
	adapter.update_password(&created.user_id, "chosen-password").await.unwrap();

	adapter.reset_password(&created.user_id, "temporary-password").await.unwrap();
	let identity = adapter.check_password("owner@acme.fr", "temporary-password").await.unwrap();
	assert!(identity.must_change_password);
}

#[tokio::test]
async fn test_session_round_trip_and_sign_out() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let created = create_owner(&adapter).await;

	let token = adapter.create_session(&created.user_id, 3600).await.unwrap();
	let identity = adapter.read_session(&token).await.unwrap();
	assert_eq!(identity.user_id, created.user_id);

	adapter.delete_session(&token).await.unwrap();
	assert!(matches!(adapter.read_session(&token).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_expired_session_is_not_found_and_purged() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let created = create_owner(&adapter).await;

	// Already expired on arrival
	let token = adapter.create_session(&created.user_id, -60).await.unwrap();
	assert!(matches!(adapter.read_session(&token).await, Err(Error::NotFound)));

	let purged = adapter.delete_expired_sessions().await.unwrap();
	assert_eq!(purged, 1);
}

#[tokio::test]
async fn test_delete_identity_removes_sessions() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let created = create_owner(&adapter).await;
	let token = adapter.create_session(&created.user_id, 3600).await.unwrap();

	adapter.delete_identity(&created.user_id).await.unwrap();

	assert!(matches!(adapter.read_identity(&created.user_id).await, Err(Error::NotFound)));
	assert!(matches!(adapter.read_session(&token).await, Err(Error::NotFound)));
}

// vim: ts=4
