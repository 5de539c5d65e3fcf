// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token endpoint response handling.

use logsrv_common_secret::SecretString;
use serde::Deserialize;

use crate::error::OAuthError;

/// Credentials returned by the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenInfo {
	/// The access token (wrapped to prevent logging).
	pub access_token: SecretString,
	pub token_type: String,
	pub scope: String,
}

impl TokenInfo {
	pub fn bearer(access_token: impl Into<String>) -> Self {
		Self {
			access_token: SecretString::new(access_token.into()),
			token_type: "bearer".to_string(),
			scope: String::new(),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
struct RawTokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

impl RawTokenResponse {
	fn from_form(body: &str) -> Self {
		let mut raw = Self::default();
		for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
			let value = Some(value.into_owned());
			match key.as_ref() {
				"access_token" => raw.access_token = value,
				"token_type" => raw.token_type = value,
				"scope" => raw.scope = value,
				"error" => raw.error = value,
				"error_description" => raw.error_description = value,
				_ => {}
			}
		}
		raw
	}
}

/// Interpret a `200` token endpoint body.
///
/// JSON is expected; form-encoded bodies are accepted when the content type
/// says so. An unparseable body is a failed exchange, never a panic.
pub fn parse_token_response(body: &str, content_type: Option<&str>) -> Result<TokenInfo, OAuthError> {
	let is_form = content_type
		.map(|ct| {
			ct.starts_with("application/x-www-form-urlencoded") || ct.starts_with("text/plain")
		})
		.unwrap_or(false);

	let raw = if is_form {
		RawTokenResponse::from_form(body)
	} else {
		serde_json::from_str::<RawTokenResponse>(body).map_err(|e| {
			OAuthError::TokenExchangeFailed(format!("malformed token response: {e}"))
		})?
	};

	if let Some(error) = raw.error.filter(|e| !e.is_empty()) {
		let message = match raw.error_description.filter(|d| !d.is_empty()) {
			Some(description) => format!("{error}: {description}"),
			None => error,
		};
		return Err(OAuthError::ProviderError(message));
	}

	let access_token = raw.access_token.unwrap_or_default();
	if access_token.is_empty() {
		return Err(OAuthError::TokenExchangeFailed(
			"token response contains no access_token".to_string(),
		));
	}

	Ok(TokenInfo {
		access_token: SecretString::new(access_token),
		token_type: raw.token_type.unwrap_or_default(),
		scope: raw.scope.unwrap_or_default(),
	})
}
