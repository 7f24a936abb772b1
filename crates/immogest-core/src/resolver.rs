//! Tenant resolution.
//!
//! Maps a URL slug to a tenant record, with a small LRU cache in front of
//! the adapter. The resolver is the leaf dependency of the guard: every
//! failure mode (missing row, inactive tenant, backend error) collapses to
//! the same terminal state at the guard boundary. No retry policy.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

use immogest_types::tenant_adapter::{TenantAdapter, TenantData};

use crate::guard::decision::ResolveState;
use crate::prelude::*;

const DEFAULT_CACHE_CAPACITY: usize = 256;
const DEFAULT_CACHE_TTL: i64 = 60;

struct CacheEntry {
	tenant: TenantData,
	cached_at: Timestamp,
}

pub struct TenantResolver {
	adapter: Arc<dyn TenantAdapter>,
	cache: Mutex<LruCache<Box<str>, CacheEntry>>,
	ttl: i64,
}

impl TenantResolver {
	pub fn new(adapter: Arc<dyn TenantAdapter>) -> Self {
		Self::with_cache(adapter, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
	}

	pub fn with_cache(adapter: Arc<dyn TenantAdapter>, capacity: usize, ttl: i64) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
		Self { adapter, cache: Mutex::new(LruCache::new(capacity)), ttl }
	}

	/// Resolves a slug to its tenant. Inactive tenants resolve to
	/// `NotFound`: at the guard boundary a suspended agency is
	/// indistinguishable from a missing one.
	pub async fn resolve(&self, slug: &str) -> IgResult<TenantData> {
		if let Some(entry) = self.cache.lock().get(slug) {
			if Timestamp::now().0 - entry.cached_at.0 < self.ttl {
				return Ok(entry.tenant.clone());
			}
		}

		let tenant = self.adapter.read_tenant_by_slug(slug).await?;
		if !tenant.active {
			debug!("Tenant {} is inactive", slug);
			return Err(Error::NotFound);
		}

		self.cache.lock().put(
			tenant.slug.clone(),
			CacheEntry { tenant: tenant.clone(), cached_at: Timestamp::now() },
		);
		Ok(tenant)
	}

	/// Guard-facing form: collapses every failure into `Failed`.
	/// Backend errors are logged before the conflation.
	pub async fn resolve_state(&self, slug: &str) -> ResolveState<TenantData> {
		match self.resolve(slug).await {
			Ok(tenant) => ResolveState::Ready(tenant),
			Err(Error::NotFound) => ResolveState::Failed,
			Err(err) => {
				warn!("Tenant fetch for '{}' failed: {}", slug, err);
				ResolveState::Failed
			}
		}
	}

	/// Evicts a slug after an admin mutation
	pub fn invalidate(&self, slug: &str) {
		self.cache.lock().pop(slug);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use immogest_types::tenant_adapter::{
		CreateIdentityData, CreateTenantData, Identity, ListTenantsOptions, TenantFeatures,
		UpdateTenantData,
	};
	use std::sync::atomic::{AtomicU32, Ordering};

	/// Adapter stub that counts slug lookups
	#[derive(Debug)]
	struct CountingAdapter {
		tenant: Option<TenantData>,
		fail: bool,
		lookups: AtomicU32,
	}

	impl CountingAdapter {
		fn with_tenant(tenant: TenantData) -> Arc<Self> {
			Arc::new(Self { tenant: Some(tenant), fail: false, lookups: AtomicU32::new(0) })
		}

		fn failing() -> Arc<Self> {
			Arc::new(Self { tenant: None, fail: true, lookups: AtomicU32::new(0) })
		}
	}

	#[async_trait]
	impl TenantAdapter for CountingAdapter {
		async fn read_tenant_by_slug(&self, slug: &str) -> IgResult<TenantData> {
			self.lookups.fetch_add(1, Ordering::SeqCst);
			if self.fail {
				return Err(Error::DbError);
			}
			match &self.tenant {
				Some(t) if t.slug.as_ref() == slug => Ok(t.clone()),
				_ => Err(Error::NotFound),
			}
		}

		async fn read_tenant(&self, _tn_id: TnId) -> IgResult<TenantData> {
			Err(Error::NotFound)
		}

		async fn create_tenant(&self, _data: CreateTenantData<'_>) -> IgResult<TnId> {
			Err(Error::DbError)
		}

		async fn update_tenant(
			&self,
			_tn_id: TnId,
			_data: &UpdateTenantData<'_>,
		) -> IgResult<TenantData> {
			Err(Error::DbError)
		}

		async fn list_tenants(
			&self,
			_opts: &ListTenantsOptions<'_>,
		) -> IgResult<Vec<TenantData>> {
			Ok(vec![])
		}

		async fn count_tenants(&self, _opts: &ListTenantsOptions<'_>) -> IgResult<u32> {
			Ok(0)
		}

		async fn create_identity(&self, _data: CreateIdentityData<'_>) -> IgResult<Identity> {
			Err(Error::DbError)
		}

		async fn read_identity(&self, _user_id: &str) -> IgResult<Identity> {
			Err(Error::NotFound)
		}

		async fn delete_identity(&self, _user_id: &str) -> IgResult<()> {
			Ok(())
		}

		async fn check_password(&self, _email: &str, _password: &str) -> IgResult<Identity> {
			Err(Error::PermissionDenied)
		}

		async fn update_password(&self, _user_id: &str, _password: &str) -> IgResult<()> {
			Ok(())
		}

		async fn reset_password(&self, _user_id: &str, _password: &str) -> IgResult<()> {
			Ok(())
		}

		async fn create_session(&self, _user_id: &str, _ttl: i64) -> IgResult<Box<str>> {
			Err(Error::DbError)
		}

		async fn read_session(&self, _token: &str) -> IgResult<Identity> {
			Err(Error::NotFound)
		}

		async fn delete_session(&self, _token: &str) -> IgResult<()> {
			Ok(())
		}

		async fn delete_expired_sessions(&self) -> IgResult<u32> {
			Ok(0)
		}
	}

	fn acme(active: bool) -> TenantData {
		TenantData {
			tn_id: TnId(1),
			slug: "acme".into(),
			name: "Acme Immobilier".into(),
			owner_id: "U1".into(),
			active,
			features: TenantFeatures::default(),
			created_at: Timestamp(1700000000),
		}
	}

	#[tokio::test]
	async fn test_resolve_hits_cache_on_second_lookup() {
		let adapter = CountingAdapter::with_tenant(acme(true));
		let resolver = TenantResolver::new(adapter.clone());

		resolver.resolve("acme").await.unwrap();
		resolver.resolve("acme").await.unwrap();
		assert_eq!(adapter.lookups.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_invalidate_forces_refetch() {
		let adapter = CountingAdapter::with_tenant(acme(true));
		let resolver = TenantResolver::new(adapter.clone());

		resolver.resolve("acme").await.unwrap();
		resolver.invalidate("acme");
		resolver.resolve("acme").await.unwrap();
		assert_eq!(adapter.lookups.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn test_inactive_tenant_resolves_to_not_found() {
		let adapter = CountingAdapter::with_tenant(acme(false));
		let resolver = TenantResolver::new(adapter);
		assert!(matches!(resolver.resolve("acme").await, Err(Error::NotFound)));
		assert_eq!(resolver.resolve_state("acme").await, ResolveState::Failed);
	}

	#[tokio::test]
	async fn test_fetch_error_and_missing_tenant_surface_identically() {
		let failing = TenantResolver::new(CountingAdapter::failing());
		let missing = TenantResolver::new(CountingAdapter::with_tenant(acme(true)));

		assert_eq!(failing.resolve_state("acme").await, ResolveState::Failed);
		assert_eq!(missing.resolve_state("ghost").await, ResolveState::Failed);
	}
}

// vim: ts=4
