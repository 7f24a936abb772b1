//! Session endpoints: login, logout, current session, password change.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode, http::header};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use immogest_core::extract::{Auth, OptionalAuth};
use immogest_types::session::SessionEvent;
use immogest_types::tenant_adapter::{Identity, Role};

use crate::prelude::*;
use crate::types::ApiResponse;

/// # Login
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
	pub user_id: String,
	pub email: Option<String>,
	pub role: Role,
	pub must_change_password: bool,
	pub token: String,
}

/// # POST /api/auth/login
#[derive(Debug, Deserialize)]
pub struct LoginReq {
	email: String,
	password: String,
}

pub async fn post_login(
	State(app): State<App>,
	Json(login): Json<LoginReq>,
) -> IgResult<(StatusCode, Json<ApiResponse<Login>>)> {
	let identity = app.tenant_adapter.check_password(&login.email, &login.password).await;

	let Ok(identity) = identity else {
		// Slow down credential guessing; the response stays identical for
		// unknown email and wrong password
		tokio::time::sleep(std::time::Duration::from_secs(1)).await;
		return Err(Error::PermissionDenied);
	};

	let token =
		app.tenant_adapter.create_session(&identity.user_id, app.opts.session_ttl).await?;
	app.session_events.emit(&SessionEvent::SignedIn(identity.clone()));
	info!("Login: {}", identity.user_id);

	let login = Login {
		user_id: identity.user_id.to_string(),
		email: identity.email.as_ref().map(ToString::to_string),
		role: identity.role,
		must_change_password: identity.must_change_password,
		token: token.to_string(),
	};

	Ok((StatusCode::OK, Json(ApiResponse::new(login))))
}

/// # POST /api/auth/logout
pub async fn post_logout(
	State(app): State<App>,
	headers: HeaderMap,
	OptionalAuth(auth): OptionalAuth,
) -> IgResult<(StatusCode, Json<ApiResponse<()>>)> {
	let token = headers
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim);

	if let Some(token) = token {
		app.tenant_adapter.delete_session(token).await?;
		app.session_events.emit(&SessionEvent::SignedOut);
		if let Some(auth) = auth {
			info!("Logout: {}", auth.user_id);
		}
	}

	Ok((StatusCode::OK, Json(ApiResponse::new(()))))
}

/// # GET /api/auth/session
///
/// Returns the identity bound to the presented token, or null. The
/// reactive session providers use this as their initial fetch.
pub async fn get_session(
	State(app): State<App>,
	headers: HeaderMap,
) -> IgResult<(StatusCode, Json<ApiResponse<Option<Identity>>>)> {
	let identity = match immogest_core::middleware::session_state(&app, &headers).await {
		immogest_types::session::SessionState::Present(identity) => Some(identity),
		_ => None,
	};

	Ok((StatusCode::OK, Json(ApiResponse::new(identity))))
}

/// # POST handler for the guarded change-password pages
#[derive(Debug, Deserialize)]
pub struct PasswordReq {
	#[serde(rename = "currentPassword")]
	current_password: String,
	#[serde(rename = "newPassword")]
	new_password: String,
}

pub async fn post_password(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<PasswordReq>,
) -> IgResult<(StatusCode, Json<ApiResponse<()>>)> {
	if req.new_password.len() < 8 {
		return Err(Error::ValidationError("Password must be at least 8 characters".into()));
	}

	if req.new_password.trim().is_empty() {
		return Err(Error::ValidationError("Password cannot be empty or only whitespace".into()));
	}

	if req.new_password == req.current_password {
		return Err(Error::ValidationError(
			"New password must be different from current password".into(),
		));
	}

	let email = auth
		.email
		.as_deref()
		.ok_or_else(|| Error::ValidationError("Identity has no email".into()))?;

	// Verify the current password before accepting the new one
	let verification = app.tenant_adapter.check_password(email, &req.current_password).await;
	if verification.is_err() {
		tokio::time::sleep(std::time::Duration::from_secs(1)).await;
		return Err(Error::PermissionDenied);
	}

	app.tenant_adapter.update_password(&auth.user_id, &req.new_password).await?;

	// Sessions stay valid; observers see the refreshed identity with the
	// forced-change flag cleared
	let refreshed = app.tenant_adapter.read_identity(&auth.user_id).await?;
	app.session_events.emit(&SessionEvent::TokenRefreshed(refreshed));
	info!("Password changed for {}", auth.user_id);

	Ok((StatusCode::OK, Json(ApiResponse::new(()))))
}

// vim: ts=4
