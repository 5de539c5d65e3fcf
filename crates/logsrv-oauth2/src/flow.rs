// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The three-legged authorization code flow.
//!
//! # OAuth Flow
//!
//! 1. [`start_flow`] generates a random state, stores it in the
//!    [`STATE_COOKIE_NAME`] cookie and redirects the browser to the provider.
//! 2. The provider redirects back with `code` and `state` (or `error`).
//! 3. [`authenticate`] compares `state` with the cookie before anything else,
//!    then exchanges the code for an access token through a [`TokenExchanger`].
//!
//! State is never stored server side: the cookie is the only record, and its
//! sole job is binding the callback to the browser that started the flow.

use std::time::Duration;

use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use logsrv_common_http::cookie::{self, extract_cookie, Cookie, SameSite};
use rand::RngCore;
use tracing::{debug, instrument};

use crate::config::OAuthConfig;
use crate::error::OAuthError;
use crate::token::{parse_token_response, TokenInfo};

/// Cookie carrying the CSRF state between flow start and callback.
pub const STATE_COOKIE_NAME: &str = "oauthState";

/// Lifetime of the state cookie.
pub const STATE_COOKIE_MAX_AGE: Duration = Duration::from_secs(10 * 60);

const STATE_BYTES: usize = 32;

/// Everything needed to answer a flow start with a `302`.
#[derive(Debug, Clone)]
pub struct FlowStart {
	/// Provider authorization URL including all query parameters.
	pub location: String,
	pub state: String,
	pub set_cookie: Cookie<'static>,
}

/// Begin an authorization code flow.
///
/// Fails only when the system random number generator fails.
#[instrument(skip(config, redirect_uri), fields(provider = %config.provider_name()))]
pub fn start_flow(config: &OAuthConfig, redirect_uri: &str) -> Result<FlowStart, OAuthError> {
	let state = random_state()?;

	let mut url = config.auth_url.clone();
	url.query_pairs_mut()
		.append_pair("client_id", &config.client_id)
		.append_pair("scope", &config.scope)
		.append_pair("redirect_uri", config.redirect_uri_or(redirect_uri))
		.append_pair("response_type", "code")
		.append_pair("state", &state);

	let set_cookie = cookie::build(STATE_COOKIE_NAME, state.clone())
		.max_age(cookie::max_age(STATE_COOKIE_MAX_AGE))
		.http_only(true)
		.same_site(SameSite::Lax)
		.build();

	debug!("starting oauth flow");
	Ok(FlowStart {
		location: url.to_string(),
		state,
		set_cookie,
	})
}

fn random_state() -> Result<String, OAuthError> {
	let mut bytes = [0u8; STATE_BYTES];
	rand::rngs::OsRng
		.try_fill_bytes(&mut bytes)
		.map_err(|e| OAuthError::Random(e.to_string()))?;
	Ok(hex::encode(bytes))
}

/// The parts of a callback request the flow looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackRequest {
	pub code: Option<String>,
	pub state: Option<String>,
	pub error: Option<String>,
	pub state_cookie: Option<String>,
}

impl CallbackRequest {
	/// Extract callback parameters from a raw query string and request headers.
	pub fn from_parts(query: Option<&str>, headers: &HeaderMap) -> Self {
		let mut request = Self {
			state_cookie: extract_cookie(headers, STATE_COOKIE_NAME).filter(|s| !s.is_empty()),
			..Default::default()
		};

		for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
			if value.is_empty() {
				continue;
			}
			let slot = match key.as_ref() {
				"code" => &mut request.code,
				"state" => &mut request.state,
				"error" => &mut request.error,
				_ => continue,
			};
			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		request
	}

	/// Whether the request looks like a provider callback.
	pub fn is_callback(&self) -> bool {
		self.code.is_some() || self.error.is_some()
	}
}

/// Exchanges an authorization code for an access token.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
	async fn exchange(
		&self,
		config: &OAuthConfig,
		code: &str,
		redirect_uri: &str,
	) -> Result<TokenInfo, OAuthError>;
}

/// Complete the flow on the callback request.
///
/// Checks, in order: provider error, state, code. Only then is the
/// exchanger called.
#[instrument(skip_all, fields(provider = %config.provider_name()))]
pub async fn authenticate(
	config: &OAuthConfig,
	request: &CallbackRequest,
	redirect_uri: &str,
	exchanger: &dyn TokenExchanger,
) -> Result<TokenInfo, OAuthError> {
	if let Some(error) = &request.error {
		return Err(OAuthError::ProviderError(error.clone()));
	}

	match (&request.state, &request.state_cookie) {
		(Some(state), Some(cookie)) if state == cookie => {}
		_ => return Err(OAuthError::StateMismatch),
	}

	let Some(code) = &request.code else {
		return Err(OAuthError::MissingCode);
	};

	exchanger
		.exchange(config, code, config.redirect_uri_or(redirect_uri))
		.await
}

/// Token exchange over HTTP with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpTokenExchanger {
	http_client: reqwest::Client,
}

impl HttpTokenExchanger {
	pub fn new() -> Result<Self, OAuthError> {
		Self::with_timeout(logsrv_common_http::DEFAULT_TIMEOUT)
	}

	pub fn with_timeout(timeout: Duration) -> Result<Self, OAuthError> {
		let http_client = logsrv_common_http::new_client_with_timeout(timeout)
			.map_err(|e| OAuthError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
		Ok(Self { http_client })
	}
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
	#[instrument(skip(self, config, code), fields(provider = %config.provider_name(), token_url = %config.token_url))]
	async fn exchange(
		&self,
		config: &OAuthConfig,
		code: &str,
		redirect_uri: &str,
	) -> Result<TokenInfo, OAuthError> {
		debug!("exchanging authorization code for access token");

		let response = self
			.http_client
			.post(config.token_url.clone())
			.header(ACCEPT, "application/json")
			.form(&[
				("client_id", config.client_id.as_str()),
				("client_secret", config.client_secret.expose().as_str()),
				("code", code),
				("redirect_uri", redirect_uri),
				("grant_type", "authorization_code"),
			])
			.send()
			.await
			.map_err(|e| OAuthError::TokenExchangeFailed(format!("request failed: {e}")))?;

		let status = response.status();
		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);
		let body = response
			.text()
			.await
			.map_err(|e| OAuthError::TokenExchangeFailed(format!("failed to read response: {e}")))?;

		if status != StatusCode::OK {
			return Err(OAuthError::TokenExchangeFailed(format!(
				"token endpoint returned {status}"
			)));
		}

		parse_token_response(&body, content_type.as_deref())
	}
}



#[cfg(test)]
mod proptests {
	use super::*;
	use crate::provider::test_support::provider;
	use proptest::prelude::*;
	use std::collections::BTreeMap;
	use std::sync::Arc;

	proptest! {
		/// Every authorization URL parameter survives encoding unchanged.
		#[test]
		fn auth_url_parameters_roundtrip(
			client_id in "[ -~]{1,40}",
			scope in "[ -~]{0,40}",
			redirect in "https://[a-z]{1,12}\\.example/[a-z/]{0,20}",
		) {
			let options: BTreeMap<String, String> = [
				("client_id".to_string(), client_id.clone()),
				("client_secret".to_string(), "s".to_string()),
				("scope".to_string(), scope.clone()),
				("redirect_uri".to_string(), redirect.clone()),
			]
			.into_iter()
			.collect();
			let p = Arc::new(provider("example", "https://idp.example.com/authorize"));
			let config = OAuthConfig::from_options(p, &options).unwrap();

			let start = start_flow(&config, "unused").unwrap();
			let url = url::Url::parse(&start.location).unwrap();
			let params: BTreeMap<String, String> = url.query_pairs().into_owned().collect();

			prop_assert_eq!(&params["client_id"], &client_id);
			let expected_scope = if scope.is_empty() { "email".to_string() } else { scope };
			prop_assert_eq!(&params["scope"], &expected_scope);
			prop_assert_eq!(&params["redirect_uri"], &redirect);
			prop_assert_eq!(&params["state"], &start.state);
		}
	}
}
