//! Custom extractors for Immogest-specific data.
//!
//! All of these read request extensions populated by the guard middleware;
//! handlers never resolve tenant or session state themselves.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use immogest_types::tenant_adapter::{Identity, TenantData};

use crate::prelude::*;

// Auth //
//******//
/// Authenticated identity, set by the guard middleware on `Render`
#[derive(Clone, Debug)]
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// OptionalAuth //
//**************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Clone, Debug)]
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// CurrentTenant //
//***************//
/// Resolved tenant of the request's slug, set by the guard middleware
#[derive(Clone, Debug)]
pub struct CurrentTenant(pub TenantData);

impl<S> FromRequestParts<S> for CurrentTenant
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(tenant) = parts.extensions.get::<CurrentTenant>().cloned() {
			Ok(tenant)
		} else {
			Err(Error::NotFound)
		}
	}
}

// vim: ts=4
