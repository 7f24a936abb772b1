//! App state type

use std::sync::Arc;

use immogest_types::tenant_adapter::TenantAdapter;
use immogest_types::worker::WorkerPool;

use crate::request::Request;
use crate::resolver::TenantResolver;
use crate::scheduler::Scheduler;
use crate::session::SessionEvents;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub tenant_adapter: Arc<dyn TenantAdapter>,
	pub resolver: TenantResolver,
	pub scheduler: Arc<Scheduler<App>>,
	pub session_events: SessionEvents,
	pub request: Request,
	pub worker: Arc<WorkerPool>,
}

pub type App = Arc<AppState>;

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Base URL of the mailer relay; `None` disables outbound email
	pub mailer_url: Option<Box<str>>,
	/// Bootstrap admin credentials, applied only when no admin identity exists
	pub admin_email: Option<Box<str>>,
	pub admin_password: Option<Box<str>>,
	/// Session lifetime in seconds
	pub session_ttl: i64,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			mailer_url: None,
			admin_email: None,
			admin_password: None,
			session_ttl: immogest_types::tenant_adapter::SESSION_TTL,
		}
	}
}

// vim: ts=4
