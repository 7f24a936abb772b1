use axum::{
	Router, middleware,
	routing::{get, post},
};

use immogest_core::middleware::{require_admin, tenant_guard};

use crate::prelude::*;
use crate::{admin, auth, portal};

fn admin_routes(state: App) -> Router<App> {
	Router::new()
		.route("/api/admin/tenants", get(admin::tenant::list_tenants))
		.route("/api/admin/agencies", post(admin::tenant::create_agency_user))
		.route(
			"/api/admin/tenants/{slug}",
			get(admin::tenant::get_tenant).patch(admin::tenant::patch_tenant),
		)
		.route(
			"/api/admin/tenants/{slug}/password-reset",
			post(admin::tenant::send_password_reset),
		)
		.layer(middleware::from_fn_with_state(state, require_admin))
}

fn auth_routes() -> Router<App> {
	Router::new()
		.route("/api/auth/login", post(auth::handler::post_login))
		.route("/api/auth/logout", post(auth::handler::post_logout))
		.route("/api/auth/session", get(auth::handler::get_session))
}

/// The guarded page tree. Every route here goes through the tenant guard;
/// handlers only run on a `Render` outcome.
fn portal_routes(state: App) -> Router<App> {
	Router::new()
		.route("/{slug}", get(portal::handler::get_tenant_home))
		.route(
			"/{slug}/agency/auth",
			get(portal::handler::get_agency_auth).post(auth::handler::post_login),
		)
		.route("/{slug}/agency/dashboard", get(portal::handler::get_agency_dashboard))
		.route("/{slug}/agency/services", get(portal::handler::get_agency_services))
		.route(
			"/{slug}/agency/change-password",
			get(portal::handler::get_change_password).post(auth::handler::post_password),
		)
		.route("/{slug}/proprietaire/dashboard", get(portal::handler::get_proprietor_dashboard))
		.route(
			"/{slug}/proprietaire/change-password",
			get(portal::handler::get_change_password).post(auth::handler::post_password),
		)
		.layer(middleware::from_fn_with_state(state, tenant_guard))
}

pub fn init(state: App) -> Router {
	Router::new()
		.route("/404", get(portal::handler::get_not_found))
		.route("/admin/auth", get(portal::handler::get_admin_auth))
		.merge(auth_routes())
		.merge(admin_routes(state.clone()))
		.merge(portal_routes(state.clone()))
		.layer(tower_http::trace::TraceLayer::new_for_http())
		// The agency front-ends are served from their own origins
		.layer(tower_http::cors::CorsLayer::permissive())
		.with_state(state)
}

// vim: ts=4
