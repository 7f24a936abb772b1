//! Shared test setup: a full app state over a temporary SQLite database
//! and helpers for driving the composed router.

use axum::{
	Router,
	body::Body,
	http::{Request, Response, header},
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use immogest::{AppBuilderOpts, AppState, bootstrap, routes};
use immogest_core::app::App;
use immogest_core::request::Request as HttpClient;
use immogest_core::resolver::TenantResolver;
use immogest_core::scheduler::Scheduler;
use immogest_core::session::SessionEvents;
use immogest_tenant_adapter_sqlite::TenantAdapterSqlite;
use immogest_types::worker::WorkerPool;

pub const ADMIN_EMAIL: &str = "admin@immogest.fr";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Build a complete app over a temp database, with a bootstrapped admin
pub async fn build_test_app() -> (App, TempDir) {
	let tmp = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1));
	let tenant_adapter = Arc::new(
		TenantAdapterSqlite::new(Arc::clone(&worker), tmp.path().join("test.db"))
			.await
			.unwrap(),
	);

	let app: App = Arc::new(AppState {
		resolver: TenantResolver::new(tenant_adapter.clone()),
		tenant_adapter,
		scheduler: Scheduler::new(),
		session_events: SessionEvents::new(),
		request: HttpClient::new(),
		worker,
		opts: AppBuilderOpts {
			admin_email: Some(ADMIN_EMAIL.into()),
			admin_password: Some(ADMIN_PASSWORD.into()),
			..Default::default()
		},
	});

	bootstrap::ensure_admin(&app).await.unwrap();
	(app, tmp)
}

pub fn test_router(app: App) -> Router {
	routes::init(app)
}

pub async fn get(router: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
	let mut builder = Request::builder().method("GET").uri(uri);
	if let Some(token) = token {
		builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
	}
	router.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post_json(
	router: &Router,
	uri: &str,
	token: Option<&str>,
	body: serde_json::Value,
) -> Response<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json");
	if let Some(token) = token {
		builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
	}
	router
		.clone()
		.oneshot(builder.body(Body::from(body.to_string())).unwrap())
		.await
		.unwrap()
}

pub async fn patch_json(
	router: &Router,
	uri: &str,
	token: Option<&str>,
	body: serde_json::Value,
) -> Response<Body> {
	let mut builder = Request::builder()
		.method("PATCH")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json");
	if let Some(token) = token {
		builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
	}
	router
		.clone()
		.oneshot(builder.body(Body::from(body.to_string())).unwrap())
		.await
		.unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
	let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub fn location(res: &Response<Body>) -> &str {
	res.headers().get(header::LOCATION).and_then(|h| h.to_str().ok()).unwrap_or_default()
}

/// Sign in and return the session token
pub async fn login(router: &Router, email: &str, password: &str) -> String {
	let res = post_json(
		router,
		"/api/auth/login",
		None,
		serde_json::json!({ "email": email, "password": password }),
	)
	.await;
	assert_eq!(res.status(), axum::http::StatusCode::OK, "login failed for {}", email);
	let body = body_json(res).await;
	body["data"]["token"].as_str().unwrap().to_string()
}

/// Provision an agency through the admin API, returns (owner token, temp password)
pub async fn provision_agency(
	router: &Router,
	admin_token: &str,
	slug: &str,
	email: &str,
) -> String {
	let res = post_json(
		router,
		"/api/admin/agencies",
		Some(admin_token),
		serde_json::json!({
			"slug": slug,
			"name": format!("{} Immobilier", slug),
			"email": email,
			"hasImmoModule": true,
		}),
	)
	.await;
	assert_eq!(res.status(), axum::http::StatusCode::CREATED);
	let body = body_json(res).await;
	body["data"]["tempPassword"].as_str().unwrap().to_string()
}

// vim: ts=4
