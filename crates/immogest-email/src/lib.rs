//! Email delivery for the Immogest platform.
//!
//! This crate provides:
//! - Per-recipient placeholder substitution for fund-call and notification
//!   templates (`{NOM}`, `{PRENOM}`, `{MONTANT}`, ...)
//! - SMTP email sending with lettre
//! - Settings loaded from the environment

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod sender;
pub mod settings;
pub mod template;

pub use sender::EmailSender;
pub use settings::SmtpSettings;
pub use template::{Recipient, substitute};

mod prelude;

use serde::{Deserialize, Serialize};

/// Attachment carried base64-encoded over the relay API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
	pub filename: String,
	/// Base64-encoded file content
	pub content: String,
	#[serde(rename = "contentType", default)]
	pub content_type: Option<String>,
}

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
	pub to: String,
	pub subject: String,
	pub html: String,
	/// Optional sender override (e.g. "Agence Acme <contact@acme.fr>")
	#[serde(default)]
	pub from: Option<String>,
	#[serde(default)]
	pub attachments: Vec<Attachment>,
}

// vim: ts=4
