//! Adapter that manages and stores tenant, identity and session data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::{prelude::*, types::serialize_timestamp_iso};

/// Default session lifetime in seconds
pub const SESSION_TTL: i64 = 8 * 3600;

/// Role attached to an identity at creation time.
///
/// The guard trusts this metadata as-is; there is no re-derivation from
/// stored state at evaluation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	AgencyOwner,
	Proprietor,
	Client,
	Admin,
}

/// An authenticated principal
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
	pub user_id: Box<str>,
	pub email: Option<Box<str>>,
	pub role: Role,
	/// Set on provisioned identities until their first password change
	pub must_change_password: bool,
}

/// Capability toggles of a tenant
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TenantFeatures {
	#[serde(rename = "hasImmoModule", default)]
	pub immo: bool,
	#[serde(rename = "hasLocativeModule", default)]
	pub locative: bool,
}

/// An onboarded agency, addressed by its immutable slug
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantData {
	pub tn_id: TnId,
	pub slug: Box<str>,
	pub name: Box<str>,
	/// Identity that administratively owns the tenant
	pub owner_id: Box<str>,
	pub active: bool,
	#[serde(flatten)]
	pub features: TenantFeatures,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

/// Data needed to create a new tenant
#[derive(Debug)]
pub struct CreateTenantData<'a> {
	pub slug: &'a str,
	pub name: &'a str,
	pub owner_id: &'a str,
	pub features: TenantFeatures,
}

/// Partial tenant update. `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateTenantData<'a> {
	pub name: Option<&'a str>,
	pub active: Option<bool>,
	pub owner_id: Option<&'a str>,
	pub features: Option<TenantFeatures>,
}

/// Options for listing tenants (admin console)
#[derive(Debug, Default)]
pub struct ListTenantsOptions<'a> {
	pub active: Option<bool>,
	pub q: Option<&'a str>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

/// Data needed to create a new identity
#[derive(Debug)]
pub struct CreateIdentityData<'a> {
	pub email: &'a str,
	pub password: &'a str,
	pub role: Role,
	pub must_change_password: bool,
}

/// An Immogest tenant adapter.
///
/// A `TenantAdapter` is responsible for storing and managing all tenant,
/// identity and session data. Every storage backend implements this trait.
#[async_trait]
pub trait TenantAdapter: Debug + Send + Sync {
	/// # Tenants
	/// Reads a tenant by its URL slug, active or not
	async fn read_tenant_by_slug(&self, slug: &str) -> IgResult<TenantData>;

	/// Reads a tenant by its internal id
	async fn read_tenant(&self, tn_id: TnId) -> IgResult<TenantData>;

	/// Creates a new tenant. Fails with `ValidationError` on a duplicate slug.
	async fn create_tenant(&self, data: CreateTenantData<'_>) -> IgResult<TnId>;

	/// Applies a partial update and returns the new state
	async fn update_tenant(&self, tn_id: TnId, data: &UpdateTenantData<'_>)
	-> IgResult<TenantData>;

	/// Lists tenants for the admin console
	async fn list_tenants(&self, opts: &ListTenantsOptions<'_>) -> IgResult<Vec<TenantData>>;

	/// Counts tenants matching the filter, ignoring `limit`/`offset`
	async fn count_tenants(&self, opts: &ListTenantsOptions<'_>) -> IgResult<u32>;

	/// # Identities
	/// Creates an identity. Fails with `ValidationError` on a duplicate email.
	async fn create_identity(&self, data: CreateIdentityData<'_>) -> IgResult<Identity>;

	async fn read_identity(&self, user_id: &str) -> IgResult<Identity>;

	/// Deletes an identity and its sessions. Used as the compensation step
	/// of agency provisioning.
	async fn delete_identity(&self, user_id: &str) -> IgResult<()>;

	/// Verifies credentials and returns the identity on success
	async fn check_password(&self, email: &str, password: &str) -> IgResult<Identity>;

	/// Stores a new password hash and clears `must_change_password`
	async fn update_password(&self, user_id: &str, password: &str) -> IgResult<()>;

	/// Stores an admin-issued temporary password and sets
	/// `must_change_password`
	async fn reset_password(&self, user_id: &str, password: &str) -> IgResult<()>;

	/// # Sessions
	/// Creates a session and returns its opaque token
	async fn create_session(&self, user_id: &str, ttl: i64) -> IgResult<Box<str>>;

	/// Resolves a session token to its identity. Expired sessions resolve
	/// to `NotFound`.
	async fn read_session(&self, token: &str) -> IgResult<Identity>;

	async fn delete_session(&self, token: &str) -> IgResult<()>;

	/// Purges expired sessions, returns the number of rows removed
	async fn delete_expired_sessions(&self) -> IgResult<u32>;
}


// vim: ts=4
