//! Integration tests - tenant lifecycle
//!
//! Covers creation, slug uniqueness, partial updates (activation,
//! feature toggles, owner transfer) and admin listing filters.

use std::sync::Arc;
use tempfile::TempDir;

use immogest_tenant_adapter_sqlite::TenantAdapterSqlite;
use immogest::prelude::*;
use immogest::tenant_adapter::{
	CreateTenantData, ListTenantsOptions, TenantAdapter, TenantFeatures, UpdateTenantData,
};
use immogest::worker::WorkerPool;

/// Helper to create a test adapter with a temporary database
async fn create_test_adapter() -> IgResult<(TenantAdapterSqlite, TempDir)> {
	let tmp_dir = TempDir::new()?;
	let db_path = tmp_dir.path().join("tenants.db");
	let worker = Arc::new(WorkerPool::new(1));
	let adapter = TenantAdapterSqlite::new(worker, db_path).await?;
	Ok((adapter, tmp_dir))
}

fn acme<'a>() -> CreateTenantData<'a> {
	CreateTenantData {
		slug: "acme",
		name: "Acme Immobilier",
		owner_id: "U1",
		features: TenantFeatures { immo: true, locative: false },
	}
}

#[tokio::test]
async fn test_create_and_read_tenant() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();

	let tn_id = adapter.create_tenant(acme()).await.unwrap();

	let by_slug = adapter.read_tenant_by_slug("acme").await.unwrap();
	assert_eq!(by_slug.tn_id, tn_id);
	assert_eq!(by_slug.name.as_ref(), "Acme Immobilier");
	assert_eq!(by_slug.owner_id.as_ref(), "U1");
	assert!(by_slug.active);
	assert!(by_slug.features.immo);
	assert!(!by_slug.features.locative);

	let by_id = adapter.read_tenant(tn_id).await.unwrap();
	assert_eq!(by_id.slug.as_ref(), "acme");
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	assert!(matches!(adapter.read_tenant_by_slug("ghost").await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_duplicate_slug_is_rejected() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();

	adapter.create_tenant(acme()).await.unwrap();
	let res = adapter.create_tenant(acme()).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_invalid_slug_is_rejected() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();

	for slug in ["", "Acme", "acme agency", "acme/x"] {
		let res = adapter
			.create_tenant(CreateTenantData {
				slug,
				name: "Bad",
				owner_id: "U1",
				features: TenantFeatures::default(),
			})
			.await;
		assert!(matches!(res, Err(Error::ValidationError(_))), "slug {:?} was accepted", slug);
	}
}

#[tokio::test]
async fn test_update_tenant_partial() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let tn_id = adapter.create_tenant(acme()).await.unwrap();

	// Deactivate only; everything else stays
	let updated = adapter
		.update_tenant(tn_id, &UpdateTenantData { active: Some(false), ..Default::default() })
		.await
		.unwrap();
	assert!(!updated.active);
	assert_eq!(updated.name.as_ref(), "Acme Immobilier");
	assert!(updated.features.immo);

	// Flip features and transfer ownership
	let updated = adapter
		.update_tenant(
			tn_id,
			&UpdateTenantData {
				owner_id: Some("U9"),
				features: Some(TenantFeatures { immo: true, locative: true }),
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(updated.owner_id.as_ref(), "U9");
	assert!(updated.features.locative);
	assert!(!updated.active);
}

#[tokio::test]
async fn test_list_tenants_filters() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();

	let acme_id = adapter.create_tenant(acme()).await.unwrap();
	adapter
		.create_tenant(CreateTenantData {
			slug: "horizon",
			name: "Horizon Gestion",
			owner_id: "U2",
			features: TenantFeatures::default(),
		})
		.await
		.unwrap();
	adapter
		.update_tenant(acme_id, &UpdateTenantData { active: Some(false), ..Default::default() })
		.await
		.unwrap();

	let all = adapter.list_tenants(&ListTenantsOptions::default()).await.unwrap();
	assert_eq!(all.len(), 2);

	let active_opts = ListTenantsOptions { active: Some(true), ..Default::default() };
	let active = adapter.list_tenants(&active_opts).await.unwrap();
	assert_eq!(active.len(), 1);
	assert_eq!(active[0].slug.as_ref(), "horizon");

	let searched = adapter
		.list_tenants(&ListTenantsOptions { q: Some("gestion"), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(searched.len(), 1);
	assert_eq!(searched[0].slug.as_ref(), "horizon");
}

#[tokio::test]
async fn test_count_tenants_ignores_pagination() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();

	for slug in ["acme", "horizon", "lumiere"] {
		adapter
			.create_tenant(CreateTenantData {
				slug,
				name: slug,
				owner_id: "U1",
				features: TenantFeatures::default(),
			})
			.await
			.unwrap();
	}

	let page = adapter
		.list_tenants(&ListTenantsOptions { limit: Some(2), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(page.len(), 2);

	// The count covers the whole filtered set, not the page
	let total = adapter.count_tenants(&ListTenantsOptions::default()).await.unwrap();
	assert_eq!(total, 3);

	let searched = adapter
		.count_tenants(&ListTenantsOptions { q: Some("hori"), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(searched, 1);
}

// vim: ts=4
