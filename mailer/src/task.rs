//! Background retry of deferred sends.
//!
//! Retry pacing comes from the scheduler's RetryPolicy; this task only
//! attempts one delivery per run.

use async_trait::async_trait;

use immogest_core::scheduler::Task;
use immogest_email::EmailMessage;
use immogest_types::prelude::*;

use crate::MailerApp;

#[derive(Debug)]
pub struct RetrySendTask {
	message: EmailMessage,
}

impl RetrySendTask {
	pub fn new(message: EmailMessage) -> Self {
		Self { message }
	}
}

#[async_trait]
impl Task<MailerApp> for RetrySendTask {
	fn kind() -> &'static str {
		"mailer.retry_send"
	}

	fn kind_of(&self) -> &'static str {
		Self::kind()
	}

	async fn run(&self, state: &MailerApp) -> IgResult<()> {
		info!("Retrying deferred email to {}", self.message.to);
		state.sender.send(&self.message).await
	}
}

// vim: ts=4
