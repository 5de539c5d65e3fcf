// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Custom claims fetched from an HTTP endpoint per login.
//!
//! The endpoint is called with `GET` and the identity in the query string
//! (`sub`, `origin`, `domain`, one `groups` per group). `200` with a JSON
//! object supplies claims, `204` means none.

use std::time::Duration;

use async_trait::async_trait;
use logsrv_common_core::Identity;
use logsrv_common_secret::SecretString;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::{ClaimsError, ClaimsSource, CustomClaims};

pub struct EndpointClaimsSource {
	url: Url,
	token: Option<SecretString>,
	http_client: reqwest::Client,
}

impl EndpointClaimsSource {
	pub fn new(
		endpoint: &str,
		token: Option<SecretString>,
		timeout: Duration,
	) -> Result<Self, ClaimsError> {
		let url = Url::parse(endpoint)
			.map_err(|e| ClaimsError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
		let http_client = logsrv_common_http::new_client_with_timeout(timeout)
			.map_err(|e| ClaimsError::InvalidEndpoint(format!("failed to build HTTP client: {e}")))?;
		Ok(Self {
			url,
			token,
			http_client,
		})
	}

	fn request_url(&self, identity: &Identity) -> Url {
		let mut url = self.url.clone();
		{
			let mut query = url.query_pairs_mut();
			query
				.append_pair("sub", &identity.sub)
				.append_pair("origin", &identity.origin);
			if let Some(domain) = &identity.domain {
				query.append_pair("domain", domain);
			}
			for group in &identity.groups {
				query.append_pair("groups", group);
			}
		}
		url
	}
}

impl std::fmt::Debug for EndpointClaimsSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EndpointClaimsSource")
			.field("url", &self.url.as_str())
			.field("token", &self.token)
			.finish()
	}
}

#[async_trait]
impl ClaimsSource for EndpointClaimsSource {
	#[instrument(skip_all, fields(endpoint = %self.url, sub = %identity.sub))]
	async fn claims_for(&self, identity: &Identity) -> Result<Option<CustomClaims>, ClaimsError> {
		let mut request = self.http_client.get(self.request_url(identity));
		if let Some(token) = &self.token {
			request = request.bearer_auth(token.expose());
		}

		let response = request
			.send()
			.await
			.map_err(|e| ClaimsError::Endpoint(format!("request failed: {e}")))?;

		match response.status() {
			StatusCode::NO_CONTENT => {
				debug!("claims endpoint has no claims for user");
				Ok(None)
			}
			StatusCode::OK => {
				let value: Value = response
					.json()
					.await
					.map_err(|e| ClaimsError::Malformed(format!("invalid JSON: {e}")))?;
				match value {
					Value::Object(map) => Ok(Some(map)),
					other => Err(ClaimsError::Malformed(format!(
						"expected a JSON object, got {other}"
					))),
				}
			}
			status => Err(ClaimsError::Endpoint(format!("endpoint returned {status}"))),
		}
	}
}
