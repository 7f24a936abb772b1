use std::{path::PathBuf, sync::Arc};

use immogest::{AppBuilderOpts, AppState, auth, bootstrap, routes};
use immogest_core::request::Request;
use immogest_core::resolver::TenantResolver;
use immogest_core::scheduler::Scheduler;
use immogest_core::session::SessionEvents;
use immogest_tenant_adapter_sqlite::TenantAdapterSqlite;
use immogest_types::prelude::*;
use immogest_types::worker::WorkerPool;

fn env_opt(name: &str) -> Option<Box<str>> {
	std::env::var(name).ok().filter(|v| !v.is_empty()).map(String::into_boxed_str)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.init();

	let opts = AppBuilderOpts {
		listen: env_opt("IMMOGEST_LISTEN").unwrap_or_else(|| "127.0.0.1:8080".into()),
		mailer_url: env_opt("IMMOGEST_MAILER_URL"),
		admin_email: env_opt("IMMOGEST_ADMIN_EMAIL"),
		admin_password: env_opt("IMMOGEST_ADMIN_PASSWORD"),
		session_ttl: env_opt("IMMOGEST_SESSION_TTL")
			.and_then(|v| v.parse().ok())
			.unwrap_or(immogest_types::tenant_adapter::SESSION_TTL),
	};

	let db_path = PathBuf::from(
		env_opt("IMMOGEST_DB").unwrap_or_else(|| "./data/immogest.db".into()).as_ref(),
	);
	if let Some(parent) = db_path.parent() {
		tokio::fs::create_dir_all(parent).await?;
	}

	let worker = Arc::new(WorkerPool::new(2));
	let tenant_adapter = Arc::new(TenantAdapterSqlite::new(Arc::clone(&worker), &db_path).await?);
	let scheduler = Scheduler::new();

	let app = Arc::new(AppState {
		resolver: TenantResolver::new(tenant_adapter.clone()),
		tenant_adapter,
		scheduler: Arc::clone(&scheduler),
		session_events: SessionEvents::new(),
		request: Request::new(),
		worker,
		opts,
	});

	scheduler.start(app.clone());
	scheduler
		.task(Arc::new(auth::cleanup::SessionCleanupTask))
		.key("auth.session_cleanup")
		.daily_at(3, 0)
		.schedule()
		.await?;

	bootstrap::ensure_admin(&app).await?;

	let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
	info!("Immogest {} listening on {}", immogest_core::app::VERSION, app.opts.listen);

	axum::serve(listener, routes::init(app)).await?;
	Ok(())
}

// vim: ts=4
