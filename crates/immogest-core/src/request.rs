//! Request client implementation.
//!
//! Thin wrapper around a shared reqwest client, used for fire-and-forget
//! calls to the mailer relay.

use serde::{Serialize, de::DeserializeOwned};

use crate::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct Request(reqwest::Client);

impl Request {
	pub fn new() -> Self {
		Request(reqwest::Client::new())
	}

	pub async fn post<Res>(&self, url: &str, data: &impl Serialize) -> IgResult<Res>
	where
		Res: DeserializeOwned,
	{
		let res = self
			.0
			.post(url)
			.json(data)
			.send()
			.await
			.map_err(|err| Error::ServiceUnavailable(format!("POST {} failed: {}", url, err)))?;

		res.json().await.map_err(|err| {
			error!("Failed to deserialize response from {}: {}", url, err);
			Error::ServiceUnavailable(format!("Invalid response from {}", url))
		})
	}
}

// vim: ts=4
