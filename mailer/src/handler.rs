//! Relay HTTP handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use immogest_core::scheduler::RetryPolicy;
use immogest_email::{Attachment, EmailMessage, Recipient, substitute};
use immogest_types::prelude::*;

use crate::MailerApp;
use crate::task::RetrySendTask;

const APPEL_DE_FOND_PREFIX: &str = "[Appel de fonds] ";

/// # POST /api/send-email
#[derive(Debug, Deserialize)]
pub struct SendEmailReq {
	pub to: String,
	pub subject: String,
	pub html: String,
	#[serde(default)]
	pub from: Option<String>,
	#[serde(default)]
	pub attachments: Vec<Attachment>,
}

pub async fn post_send_email(
	State(state): State<MailerApp>,
	Json(req): Json<SendEmailReq>,
) -> IgResult<(StatusCode, Json<serde_json::Value>)> {
	let message = EmailMessage {
		to: req.to,
		subject: req.subject,
		html: req.html,
		from: req.from,
		attachments: req.attachments,
	};

	match state.sender.send(&message).await {
		Ok(()) => Ok((
			StatusCode::OK,
			Json(json!({ "success": true, "data": { "to": message.to } })),
		)),
		Err(Error::ValidationError(msg)) => Err(Error::ValidationError(msg)),
		Err(err) => {
			// Transient failure: hand the message to the retry queue
			warn!("Send to {} failed, scheduling retry: {}", message.to, err);
			let key = format!("email:{}", message.to);
			state
				.scheduler
				.task(Arc::new(RetrySendTask::new(message.clone())))
				.key(key)
				.schedule_after(60)
				.with_retry(RetryPolicy::new((60, 3600), 5))
				.schedule()
				.await?;

			Ok((
				StatusCode::OK,
				Json(json!({
					"success": false,
					"error": format!("delivery deferred: {}", err),
				})),
			))
		}
	}
}

/// # POST /api/send-bulk-email
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBulkEmailReq {
	pub recipients: Vec<Recipient>,
	pub subject: String,
	pub html: String,
	#[serde(default)]
	pub from: Option<String>,
	#[serde(default)]
	pub attachments: Vec<Attachment>,
	/// Marks copropriety fund-call notices
	#[serde(default)]
	pub appel_de_fond: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
	pub email: String,
	pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkError {
	pub email: String,
	pub error: String,
}

/// Renders the per-recipient message list. Substitution applies to both
/// the body and the subject line.
fn render_bulk(req: &SendBulkEmailReq) -> Vec<EmailMessage> {
	let subject = if req.appel_de_fond {
		format!("{}{}", APPEL_DE_FOND_PREFIX, req.subject)
	} else {
		req.subject.clone()
	};

	req.recipients
		.iter()
		.map(|recipient| EmailMessage {
			to: recipient.email.clone(),
			subject: substitute(&subject, recipient),
			html: substitute(&req.html, recipient),
			from: req.from.clone(),
			attachments: req.attachments.clone(),
		})
		.collect()
}

pub async fn post_send_bulk_email(
	State(state): State<MailerApp>,
	Json(req): Json<SendBulkEmailReq>,
) -> IgResult<(StatusCode, Json<serde_json::Value>)> {
	if req.recipients.is_empty() {
		return Err(Error::ValidationError("Recipient list is empty".into()));
	}

	let messages = render_bulk(&req);
	let mut results: Vec<BulkResult> = Vec::with_capacity(messages.len());
	let mut errors: Vec<BulkError> = Vec::new();

	for message in messages {
		match state.sender.send(&message).await {
			Ok(()) => results.push(BulkResult { email: message.to, success: true }),
			Err(err) => {
				results.push(BulkResult { email: message.to.clone(), success: false });
				errors.push(BulkError { email: message.to, error: err.to_string() });
			}
		}
	}

	info!(
		"Bulk send finished: {} ok, {} failed",
		results.iter().filter(|r| r.success).count(),
		errors.len()
	);

	Ok((
		StatusCode::OK,
		Json(json!({
			"success": errors.is_empty(),
			"results": results,
			"errors": errors,
		})),
	))
}


// vim: ts=4
