//! Immogest mail relay.
//!
//! A deliberately small, separate process: the platform hands it fully
//! rendered HTML and recipient lists, it substitutes per-recipient
//! placeholders and talks SMTP. Failed single sends are retried in the
//! background with exponential backoff.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod handler;
mod task;

use std::sync::Arc;

use immogest_core::scheduler::Scheduler;
use immogest_email::{EmailSender, SmtpSettings};
use immogest_types::prelude::*;

pub struct MailerState {
	pub sender: EmailSender,
	pub scheduler: Arc<Scheduler<MailerApp>>,
}

pub type MailerApp = Arc<MailerState>;

fn router(state: MailerApp) -> axum::Router {
	use axum::routing::post;

	axum::Router::new()
		.route("/api/send-email", post(handler::post_send_email))
		.route("/api/send-bulk-email", post(handler::post_send_bulk_email))
		.with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.init();

	let settings = SmtpSettings::from_env()?;
	let listen =
		std::env::var("MAILER_LISTEN").unwrap_or_else(|_| "127.0.0.1:8025".to_string());

	let scheduler = Scheduler::new();
	let state: MailerApp = Arc::new(MailerState {
		sender: EmailSender::new(settings),
		scheduler: Arc::clone(&scheduler),
	});
	scheduler.start(Arc::clone(&state));

	let listener = tokio::net::TcpListener::bind(&listen).await?;
	info!("Mailer listening on {}", listen);

	axum::serve(listener, router(state)).await?;
	Ok(())
}

// vim: ts=4
