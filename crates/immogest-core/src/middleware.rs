//! Custom middlewares.
//!
//! `tenant_guard` wires the pure guard decision into the HTTP layer: it
//! awaits tenant resolution and session classification, evaluates the
//! decision table, and maps the outcome onto the response. Unauthorized
//! access is a silent redirect, never an error body.

use axum::{
	body::Body,
	extract::State,
	http::{HeaderMap, Request, StatusCode, header},
	middleware::Next,
	response::{IntoResponse, Redirect, Response},
};

use immogest_types::session::SessionState;
use immogest_types::tenant_adapter::Role;

use crate::extract::{Auth, CurrentTenant};
use crate::guard::decision::{ADMIN_AUTH_PATH, GuardOutcome, NOT_FOUND_PATH, ResolveState, evaluate};
use crate::prelude::*;

/// Extracts the bearer token, if any
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
}

/// Classifies the request's session from its bearer token.
///
/// A transient lookup failure is logged and classified as absent; it never
/// blocks the request.
pub async fn session_state(app: &App, headers: &HeaderMap) -> SessionState {
	let Some(token) = bearer_token(headers) else {
		return SessionState::Absent;
	};

	match app.tenant_adapter.read_session(token).await {
		Ok(identity) => SessionState::Present(identity),
		Err(Error::NotFound) => SessionState::Absent,
		Err(err) => {
			warn!("Session fetch failed: {}", err);
			SessionState::Absent
		}
	}
}

/// Guard middleware for the `/{slug}/...` page tree.
///
/// Re-evaluated on every request; both async inputs are awaited before
/// evaluation, so `ShowLoading` cannot escape to a response here.
pub async fn tenant_guard(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> IgResult<Response> {
	let path = req.uri().path().to_owned();
	let Some(slug) =
		path.trim_start_matches('/').split('/').next().filter(|s| !s.is_empty())
	else {
		return Ok(Redirect::temporary(NOT_FOUND_PATH).into_response());
	};

	let tenant = app.resolver.resolve_state(slug).await;
	let session = session_state(&app, req.headers()).await;

	match evaluate(&tenant, &session, &path) {
		GuardOutcome::Render => {
			if let ResolveState::Ready(tenant) = tenant {
				req.extensions_mut().insert(CurrentTenant(tenant));
			}
			if let SessionState::Present(identity) = session {
				req.extensions_mut().insert(Auth(identity));
			}
			Ok(next.run(req).await)
		}
		GuardOutcome::RedirectTo(target) => Ok(Redirect::temporary(&target).into_response()),
		// Both inputs settled above; kept for a total match
		GuardOutcome::ShowLoading => Ok(StatusCode::SERVICE_UNAVAILABLE.into_response()),
	}
}

/// Admin console gate: requires a session with the ADMIN role
pub async fn require_admin(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> IgResult<Response> {
	let session = session_state(&app, req.headers()).await;

	match session.identity() {
		Some(identity) if identity.role == Role::Admin => {
			let identity = identity.clone();
			req.extensions_mut().insert(Auth(identity));
			Ok(next.run(req).await)
		}
		_ => Ok(Redirect::temporary(ADMIN_AUTH_PATH).into_response()),
	}
}


// vim: ts=4
