//! SMTP email sender using lettre.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as LettreAttachment, MultiPart, SinglePart};
use lettre::transport::smtp::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, Transport};
use std::time::Duration;

use crate::prelude::*;
use crate::settings::{SmtpSettings, TlsMode};
use crate::{Attachment, EmailMessage};

/// SMTP email sender
pub struct EmailSender {
	settings: SmtpSettings,
}

impl EmailSender {
	pub fn new(settings: SmtpSettings) -> Self {
		Self { settings }
	}

	/// Send one email over SMTP
	pub async fn send(&self, message: &EmailMessage) -> IgResult<()> {
		debug!(
			"Sending email to {} via {}:{}",
			message.to, self.settings.host, self.settings.port
		);

		if !message.to.contains('@') {
			return Err(Error::ValidationError("Invalid recipient email address".into()));
		}

		let from = match &message.from {
			Some(from) => from.clone(),
			None => {
				format!("{} <{}>", self.settings.from_name, self.settings.from_address)
			}
		};

		let builder = Message::builder()
			.from(
				from.parse()
					.map_err(|_| Error::ValidationError("Invalid from email format".into()))?,
			)
			.to(message
				.to
				.parse()
				.map_err(|_| Error::ValidationError("Invalid recipient email format".into()))?)
			.subject(&message.subject);

		let html_part = SinglePart::html(message.html.clone());
		let email = if message.attachments.is_empty() {
			builder
				.singlepart(html_part)
				.map_err(|e| Error::ValidationError(format!("Failed to build email: {}", e)))?
		} else {
			let mut multipart = MultiPart::mixed().singlepart(html_part);
			for attachment in &message.attachments {
				multipart = multipart.singlepart(build_attachment(attachment)?);
			}
			builder
				.multipart(multipart)
				.map_err(|e| Error::ValidationError(format!("Failed to build email: {}", e)))?
		};

		let mailer = self.build_transport()?;

		match mailer.send(&email) {
			Ok(response) => {
				info!("Email sent to {} (response: {:?})", message.to, response);
				Ok(())
			}
			Err(e) => {
				warn!("Failed to send email to {}: {}", message.to, e);
				Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", e)))
			}
		}
	}

	fn build_transport(&self) -> IgResult<SmtpTransport> {
		let tls = match self.settings.tls_mode {
			TlsMode::Tls => lettre::transport::smtp::client::Tls::Wrapper(
				lettre::transport::smtp::client::TlsParameters::builder(
					self.settings.host.clone(),
				)
				.build()
				.map_err(|e| Error::ConfigError(format!("TLS configuration error: {}", e)))?,
			),
			TlsMode::StartTls => lettre::transport::smtp::client::Tls::Opportunistic(
				lettre::transport::smtp::client::TlsParameters::builder(
					self.settings.host.clone(),
				)
				.build()
				.map_err(|e| Error::ConfigError(format!("TLS configuration error: {}", e)))?,
			),
			TlsMode::None => lettre::transport::smtp::client::Tls::None,
		};

		let credentials =
			Credentials::new(self.settings.username.clone(), self.settings.password.clone());

		Ok(SmtpTransport::builder_dangerous(&self.settings.host)
			.port(self.settings.port)
			.timeout(Some(Duration::from_secs(self.settings.timeout_seconds)))
			.tls(tls)
			.credentials(credentials)
			.build())
	}
}

fn build_attachment(attachment: &Attachment) -> IgResult<SinglePart> {
	let content = BASE64
		.decode(&attachment.content)
		.map_err(|_| Error::ValidationError("Attachment content is not valid base64".into()))?;

	let content_type = attachment
		.content_type
		.as_deref()
		.unwrap_or("application/octet-stream")
		.parse::<ContentType>()
		.map_err(|_| Error::ValidationError("Invalid attachment content type".into()))?;

	Ok(LettreAttachment::new(attachment.filename.clone()).body(content, content_type))
}


// vim: ts=4
