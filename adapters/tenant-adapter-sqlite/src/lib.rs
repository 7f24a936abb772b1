//! SQLite-backed tenant adapter.
//!
//! Stores tenants, identities (with bcrypt password hashes) and opaque
//! session tokens in a single SQLite database. Password hashing runs on
//! the worker-thread pool, never on the async runtime.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use std::{path::Path, sync::Arc};

use immogest::prelude::*;
use immogest::tenant_adapter::{
	CreateIdentityData, CreateTenantData, Identity, ListTenantsOptions, TenantAdapter,
	TenantData, UpdateTenantData,
};
use immogest::worker::WorkerPool;

mod crypto;
mod identity;
mod schema;
mod session;
mod tenant;
mod utils;

#[derive(Debug)]
pub struct TenantAdapterSqlite {
	db: SqlitePool,
	worker: Arc<WorkerPool>,
}

impl TenantAdapterSqlite {
	pub async fn new<P: AsRef<Path>>(worker: Arc<WorkerPool>, path: P) -> IgResult<Self> {
		let options = SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(SqliteJournalMode::Wal);

		let db = SqlitePool::connect_with(options).await.map_err(|err| {
			error!("Failed to open tenant database: {}", err);
			Error::DbError
		})?;

		schema::init_db(&db).await.map_err(|err| {
			error!("Failed to initialize tenant database schema: {}", err);
			Error::DbError
		})?;

		info!("Tenant database ready at {}", path.as_ref().display());
		Ok(Self { db, worker })
	}
}

#[async_trait]
impl TenantAdapter for TenantAdapterSqlite {
	async fn read_tenant_by_slug(&self, slug: &str) -> IgResult<TenantData> {
		tenant::read_tenant_by_slug(&self.db, slug).await
	}

	async fn read_tenant(&self, tn_id: TnId) -> IgResult<TenantData> {
		tenant::read_tenant(&self.db, tn_id).await
	}

	async fn create_tenant(&self, data: CreateTenantData<'_>) -> IgResult<TnId> {
		tenant::create_tenant(&self.db, data).await
	}

	async fn update_tenant(
		&self,
		tn_id: TnId,
		data: &UpdateTenantData<'_>,
	) -> IgResult<TenantData> {
		tenant::update_tenant(&self.db, tn_id, data).await
	}

	async fn list_tenants(&self, opts: &ListTenantsOptions<'_>) -> IgResult<Vec<TenantData>> {
		tenant::list_tenants(&self.db, opts).await
	}

	async fn count_tenants(&self, opts: &ListTenantsOptions<'_>) -> IgResult<u32> {
		tenant::count_tenants(&self.db, opts).await
	}

	async fn create_identity(&self, data: CreateIdentityData<'_>) -> IgResult<Identity> {
		identity::create_identity(&self.db, &self.worker, data).await
	}

	async fn read_identity(&self, user_id: &str) -> IgResult<Identity> {
		identity::read_identity(&self.db, user_id).await
	}

	async fn delete_identity(&self, user_id: &str) -> IgResult<()> {
		identity::delete_identity(&self.db, user_id).await
	}

	async fn check_password(&self, email: &str, password: &str) -> IgResult<Identity> {
		identity::check_password(&self.db, &self.worker, email, password).await
	}

	async fn update_password(&self, user_id: &str, password: &str) -> IgResult<()> {
		identity::update_password(&self.db, &self.worker, user_id, password).await
	}

	async fn reset_password(&self, user_id: &str, password: &str) -> IgResult<()> {
		identity::reset_password(&self.db, &self.worker, user_id, password).await
	}

	async fn create_session(&self, user_id: &str, ttl: i64) -> IgResult<Box<str>> {
		session::create_session(&self.db, user_id, ttl).await
	}

	async fn read_session(&self, token: &str) -> IgResult<Identity> {
		session::read_session(&self.db, token).await
	}

	async fn delete_session(&self, token: &str) -> IgResult<()> {
		session::delete_session(&self.db, token).await
	}

	async fn delete_expired_sessions(&self) -> IgResult<u32> {
		session::delete_expired_sessions(&self.db).await
	}
}

// vim: ts=4
