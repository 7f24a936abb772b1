//! Admin tenant management handlers

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use immogest_core::utils::random_id;
use immogest_types::tenant_adapter::{
	CreateIdentityData, CreateTenantData, Identity, ListTenantsOptions, Role, TenantData,
	TenantFeatures, UpdateTenantData,
};

use crate::email;
use crate::prelude::*;
use crate::types::ApiResponse;

/// Query parameters for listing tenants
#[derive(Debug, Default, Deserialize)]
pub struct ListTenantsQuery {
	pub active: Option<bool>,
	pub q: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

/// # GET /api/admin/tenants
pub async fn list_tenants(
	State(app): State<App>,
	Query(query): Query<ListTenantsQuery>,
) -> IgResult<(StatusCode, Json<ApiResponse<Vec<TenantData>>>)> {
	info!(
		active = ?query.active,
		q = ?query.q,
		limit = ?query.limit,
		offset = ?query.offset,
		"GET /api/admin/tenants - Listing tenants"
	);

	let opts = ListTenantsOptions {
		active: query.active,
		q: query.q.as_deref(),
		limit: query.limit,
		offset: query.offset,
	};
	// `total` counts the whole filtered set, not the returned page
	let total = app.tenant_adapter.count_tenants(&opts).await?;
	let tenants = app.tenant_adapter.list_tenants(&opts).await?;

	let count = tenants.len();
	let offset = query.offset.unwrap_or(0) as usize;
	let response = ApiResponse::with_pagination(tenants, offset, count, total as usize);

	Ok((StatusCode::OK, Json(response)))
}

/// # GET /api/admin/tenants/{slug}
///
/// The admin console sees inactive tenants too; only the guard treats
/// them as missing.
pub async fn get_tenant(
	State(app): State<App>,
	Path(slug): Path<String>,
) -> IgResult<(StatusCode, Json<ApiResponse<TenantData>>)> {
	let tenant = app.tenant_adapter.read_tenant_by_slug(&slug).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(tenant))))
}

/// # PATCH /api/admin/tenants/{slug}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTenantReq {
	pub name: Option<String>,
	pub active: Option<bool>,
	pub owner_id: Option<String>,
	pub has_immo_module: Option<bool>,
	pub has_locative_module: Option<bool>,
}

pub async fn patch_tenant(
	State(app): State<App>,
	Path(slug): Path<String>,
	Json(req): Json<PatchTenantReq>,
) -> IgResult<(StatusCode, Json<ApiResponse<TenantData>>)> {
	let current = app.tenant_adapter.read_tenant_by_slug(&slug).await?;

	let features = match (req.has_immo_module, req.has_locative_module) {
		(None, None) => None,
		(immo, locative) => Some(TenantFeatures {
			immo: immo.unwrap_or(current.features.immo),
			locative: locative.unwrap_or(current.features.locative),
		}),
	};

	let update = UpdateTenantData {
		name: req.name.as_deref(),
		active: req.active,
		owner_id: req.owner_id.as_deref(),
		features,
	};
	let updated = app.tenant_adapter.update_tenant(current.tn_id, &update).await?;

	// The guard must see the mutation on the next request
	app.resolver.invalidate(&slug);
	info!("Tenant {} updated", slug);

	Ok((StatusCode::OK, Json(ApiResponse::new(updated))))
}

/// # POST /api/admin/agencies - provision an agency with its owner
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgencyReq {
	pub slug: String,
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub has_immo_module: bool,
	#[serde(default)]
	pub has_locative_module: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAgency {
	pub tenant: TenantData,
	pub owner: Identity,
	/// Returned exactly once; afterwards only the owner knows it
	pub temp_password: String,
}

pub async fn create_agency_user(
	State(app): State<App>,
	Json(req): Json<CreateAgencyReq>,
) -> IgResult<(StatusCode, Json<ApiResponse<CreatedAgency>>)> {
	info!(slug = %req.slug, "POST /api/admin/agencies - Provisioning agency");

	let temp_password = random_id()?;

	// Step 1: the owner identity
	let owner = app
		.tenant_adapter
		.create_identity(CreateIdentityData {
			email: &req.email,
			password: &temp_password,
			role: Role::AgencyOwner,
			must_change_password: true,
		})
		.await?;

	// Step 2: the tenant. There is no cross-store transaction here, so a
	// failed insert compensates by deleting the identity from step 1.
	let features =
		TenantFeatures { immo: req.has_immo_module, locative: req.has_locative_module };
	let tn_id = match app
		.tenant_adapter
		.create_tenant(CreateTenantData {
			slug: &req.slug,
			name: &req.name,
			owner_id: &owner.user_id,
			features,
		})
		.await
	{
		Ok(tn_id) => tn_id,
		Err(err) => {
			warn!(slug = %req.slug, "Tenant insert failed, compensating: {}", err);
			if let Err(comp_err) = app.tenant_adapter.delete_identity(&owner.user_id).await {
				error!(
					user_id = %owner.user_id,
					"Compensation failed, orphan identity left behind: {}", comp_err
				);
			}
			return Err(err);
		}
	};

	let tenant = app.tenant_adapter.read_tenant(tn_id).await?;

	email::send_fire_and_forget(
		&app,
		email::welcome_email(&req.email, &req.name, &req.slug, &temp_password),
	);
	info!("Agency {} provisioned (tn_id {})", req.slug, tn_id);

	let created = CreatedAgency { tenant, owner, temp_password };
	Ok((StatusCode::CREATED, Json(ApiResponse::new(created))))
}

/// Response for password reset
#[derive(Debug, Serialize)]
pub struct PasswordResetResponse {
	pub message: String,
}

/// # POST /api/admin/tenants/{slug}/password-reset
pub async fn send_password_reset(
	State(app): State<App>,
	Path(slug): Path<String>,
) -> IgResult<(StatusCode, Json<ApiResponse<PasswordResetResponse>>)> {
	info!(slug = %slug, "POST /api/admin/tenants/{{slug}}/password-reset");

	let tenant = app.tenant_adapter.read_tenant_by_slug(&slug).await?;
	let owner = app.tenant_adapter.read_identity(&tenant.owner_id).await?;

	let email_addr = owner.email.as_deref().ok_or_else(|| {
		Error::ValidationError("Tenant owner does not have an email address".to_string())
	})?;

	let temp_password = random_id()?;
	app.tenant_adapter.reset_password(&owner.user_id, &temp_password).await?;

	email::send_fire_and_forget(
		&app,
		email::password_reset_email(email_addr, &slug, &temp_password),
	);

	let response = PasswordResetResponse {
		message: format!("Password reset email sent to the owner of {}", slug),
	};
	Ok((StatusCode::OK, Json(ApiResponse::new(response))))
}

// vim: ts=4
