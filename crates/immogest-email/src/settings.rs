//! SMTP settings, loaded from the environment.

use crate::prelude::*;

/// TLS handling for the SMTP connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
	None,
	StartTls,
	Tls,
}

impl TlsMode {
	fn parse(value: &str) -> IgResult<Self> {
		match value {
			"none" => Ok(TlsMode::None),
			"starttls" => Ok(TlsMode::StartTls),
			"tls" => Ok(TlsMode::Tls),
			other => Err(Error::ConfigError(format!(
				"Invalid TLS mode: {}. Must be 'none', 'starttls', or 'tls'",
				other
			))),
		}
	}
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
	pub host: String,
	pub port: u16,
	pub username: String,
	pub password: String,
	pub tls_mode: TlsMode,
	pub from_address: String,
	pub from_name: String,
	pub timeout_seconds: u64,
}

impl SmtpSettings {
	/// Reads `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
	/// `SMTP_TLS`, `MAIL_FROM` and `MAIL_FROM_NAME`.
	pub fn from_env() -> IgResult<Self> {
		let var = |name: &str| {
			std::env::var(name)
				.map_err(|_| Error::ConfigError(format!("Missing env variable {}", name)))
		};

		let port = std::env::var("SMTP_PORT")
			.unwrap_or_else(|_| "587".to_string())
			.parse::<u16>()
			.map_err(|_| Error::ConfigError("SMTP_PORT is not a port number".into()))?;

		Ok(Self {
			host: var("SMTP_HOST")?,
			port,
			username: var("SMTP_USERNAME")?,
			password: var("SMTP_PASSWORD")?,
			tls_mode: TlsMode::parse(
				&std::env::var("SMTP_TLS").unwrap_or_else(|_| "starttls".to_string()),
			)?,
			from_address: var("MAIL_FROM")?,
			from_name: std::env::var("MAIL_FROM_NAME")
				.unwrap_or_else(|_| "Immogest".to_string()),
			timeout_seconds: 30,
		})
	}
}


// vim: ts=4
