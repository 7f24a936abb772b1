//! Page handlers for the `/{slug}/...` tree.

use axum::{Json, http::StatusCode};
use serde::Serialize;
use serde_json::json;

use immogest_core::extract::{Auth, CurrentTenant};
use immogest_types::tenant_adapter::TenantFeatures;

use crate::prelude::*;
use crate::types::ApiResponse;

/// Public tenant home payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantHome {
	pub slug: String,
	pub name: String,
	#[serde(flatten)]
	pub features: TenantFeatures,
}

/// # GET /{slug}
pub async fn get_tenant_home(
	CurrentTenant(tenant): CurrentTenant,
) -> IgResult<(StatusCode, Json<ApiResponse<TenantHome>>)> {
	let home = TenantHome {
		slug: tenant.slug.to_string(),
		name: tenant.name.to_string(),
		features: tenant.features,
	};
	Ok((StatusCode::OK, Json(ApiResponse::new(home))))
}

/// # GET /{slug}/agency/auth
pub async fn get_agency_auth(
	CurrentTenant(tenant): CurrentTenant,
) -> IgResult<(StatusCode, Json<serde_json::Value>)> {
	Ok((
		StatusCode::OK,
		Json(json!({
			"page": "auth",
			"slug": tenant.slug.as_ref(),
			"agencyName": tenant.name.as_ref(),
		})),
	))
}

/// # GET /{slug}/agency/dashboard
pub async fn get_agency_dashboard(
	CurrentTenant(tenant): CurrentTenant,
	Auth(auth): Auth,
) -> IgResult<(StatusCode, Json<serde_json::Value>)> {
	Ok((
		StatusCode::OK,
		Json(json!({
			"page": "agency-dashboard",
			"slug": tenant.slug.as_ref(),
			"agencyName": tenant.name.as_ref(),
			"ownerId": auth.user_id.as_ref(),
			"hasImmoModule": tenant.features.immo,
			"hasLocativeModule": tenant.features.locative,
		})),
	))
}

/// # GET /{slug}/agency/services
pub async fn get_agency_services(
	CurrentTenant(tenant): CurrentTenant,
) -> IgResult<(StatusCode, Json<serde_json::Value>)> {
	let mut services = vec!["clients", "rendez-vous", "messagerie"];
	if tenant.features.immo {
		services.push("annonces");
		services.push("copropriete");
	}
	if tenant.features.locative {
		services.push("gestion-locative");
	}

	Ok((
		StatusCode::OK,
		Json(json!({
			"page": "services",
			"slug": tenant.slug.as_ref(),
			"services": services,
		})),
	))
}

/// # GET /{slug}/proprietaire/dashboard
pub async fn get_proprietor_dashboard(
	CurrentTenant(tenant): CurrentTenant,
	Auth(auth): Auth,
) -> IgResult<(StatusCode, Json<serde_json::Value>)> {
	Ok((
		StatusCode::OK,
		Json(json!({
			"page": "proprietaire-dashboard",
			"slug": tenant.slug.as_ref(),
			"userId": auth.user_id.as_ref(),
		})),
	))
}

/// # GET change-password pages (agency and proprietor variants)
pub async fn get_change_password(
	CurrentTenant(tenant): CurrentTenant,
	Auth(auth): Auth,
) -> IgResult<(StatusCode, Json<serde_json::Value>)> {
	Ok((
		StatusCode::OK,
		Json(json!({
			"page": "change-password",
			"slug": tenant.slug.as_ref(),
			"userId": auth.user_id.as_ref(),
			"mustChangePassword": auth.must_change_password,
		})),
	))
}

/// # GET /404
pub async fn get_not_found() -> (StatusCode, Json<serde_json::Value>) {
	(StatusCode::NOT_FOUND, Json(json!({ "page": "not-found" })))
}

/// # GET /admin/auth
pub async fn get_admin_auth() -> (StatusCode, Json<serde_json::Value>) {
	(StatusCode::OK, Json(json!({ "page": "admin-auth" })))
}

// vim: ts=4
