//! Error type shared across the platform.
//!
//! All data-fetch errors are caught at the fetch boundary and converted
//! either to one of these variants or to a guard outcome; nothing below the
//! handler layer is allowed to panic.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub type IgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Lookup yielded no row. Tenant resolution failures are collapsed into
	/// this variant before they reach the guard.
	NotFound,
	/// Authenticated but not allowed
	PermissionDenied,
	/// No usable session
	Unauthorized,
	DbError,
	ValidationError(String),
	ConfigError(String),
	ServiceUnavailable(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::DbError => write!(f, "database error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let (status, message) = match &self {
			Error::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "permission denied".to_string()),
			Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
			Error::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
			Error::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
			// Config and internal details stay out of responses
			_ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()),
		};

		(status, Json(json!({ "success": false, "error": message }))).into_response()
	}
}

// vim: ts=4
