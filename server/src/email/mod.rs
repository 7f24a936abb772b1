//! Mailer relay client.
//!
//! The platform never talks SMTP itself: transactional mail goes through
//! the companion relay service, fire-and-forget. A relay failure is
//! logged and never propagated to the caller.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Payload of the relay's POST /api/send-email
#[derive(Debug, Clone, Serialize)]
pub struct SendEmail {
	pub to: String,
	pub subject: String,
	pub html: String,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
	success: bool,
	#[serde(default)]
	error: Option<String>,
}

/// Hands a message to the relay without blocking the caller
pub fn send_fire_and_forget(app: &App, email: SendEmail) {
	let Some(mailer_url) = app.opts.mailer_url.clone() else {
		debug!("Mailer relay not configured, dropping email to {}", email.to);
		return;
	};

	let request = app.request.clone();
	tokio::spawn(async move {
		let url = format!("{}/api/send-email", mailer_url.trim_end_matches('/'));
		match request.post::<RelayResponse>(&url, &email).await {
			Ok(res) if res.success => debug!("Relay accepted email to {}", email.to),
			Ok(res) => {
				warn!(
					"Relay deferred email to {}: {}",
					email.to,
					res.error.unwrap_or_else(|| "unknown".to_string())
				);
			}
			Err(err) => warn!("Relay call failed for {}: {}", email.to, err),
		}
	});
}

/// Welcome email for a freshly provisioned agency owner
pub fn welcome_email(to: &str, agency_name: &str, slug: &str, temp_password: &str) -> SendEmail {
	SendEmail {
		to: to.to_string(),
		subject: format!("Bienvenue sur Immogest - {}", agency_name),
		html: format!(
			"<p>Votre agence <strong>{agency_name}</strong> est en ligne.</p>\
			<p>Portail: /{slug}/agency/auth</p>\
			<p>Mot de passe temporaire: <code>{temp_password}</code></p>\
			<p>Il vous sera demandé de le changer à la première connexion.</p>"
		),
	}
}

/// Admin-initiated password reset
pub fn password_reset_email(to: &str, slug: &str, temp_password: &str) -> SendEmail {
	SendEmail {
		to: to.to_string(),
		subject: "Réinitialisation de votre mot de passe Immogest".to_string(),
		html: format!(
			"<p>Un nouveau mot de passe temporaire a été généré pour votre compte.</p>\
			<p>Portail: /{slug}/agency/auth</p>\
			<p>Mot de passe temporaire: <code>{temp_password}</code></p>\
			<p>Il vous sera demandé de le changer à la première connexion.</p>"
		),
	}
}


// vim: ts=4
