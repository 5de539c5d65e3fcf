// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-provider flow configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use logsrv_common_secret::SecretString;
use url::Url;

use crate::error::OAuthError;
use crate::provider::OAuthProvider;

/// A provider resolved from the registry plus its instance options.
///
/// Built once at start-up and immutable afterwards.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
	pub client_id: String,
	/// The OAuth application client secret (wrapped to prevent logging).
	pub client_secret: SecretString,
	pub auth_url: Url,
	pub token_url: Url,
	/// Fixed callback URL. When unset the callback URL is derived from the
	/// incoming request.
	pub redirect_uri: Option<String>,
	/// Space separated scopes.
	pub scope: String,
	pub provider: Arc<OAuthProvider>,
}

impl OAuthConfig {
	/// Build a configuration from `client_id`, `client_secret` and the
	/// optional `scope` and `redirect_uri` options.
	pub fn from_options(
		provider: Arc<OAuthProvider>,
		options: &BTreeMap<String, String>,
	) -> Result<Self, OAuthError> {
		let required = |parameter: &str| {
			options
				.get(parameter)
				.filter(|v| !v.is_empty())
				.cloned()
				.ok_or_else(|| OAuthError::MissingParameter {
					provider: provider.name.clone(),
					parameter: parameter.to_string(),
				})
		};

		let client_id = required("client_id")?;
		let client_secret = SecretString::new(required("client_secret")?);

		let scope = options
			.get("scope")
			.filter(|s| !s.is_empty())
			.cloned()
			.unwrap_or_else(|| provider.default_scopes.clone());

		let redirect_uri = options.get("redirect_uri").filter(|u| !u.is_empty()).cloned();
		if let Some(uri) = &redirect_uri {
			Url::parse(uri).map_err(|e| {
				OAuthError::InvalidConfig(format!("{}: invalid redirect_uri '{uri}': {e}", provider.name))
			})?;
		}

		let auth_url = parse_endpoint(&provider.name, "auth_url", &provider.auth_url)?;
		let token_url = parse_endpoint(&provider.name, "token_url", &provider.token_url)?;

		Ok(Self {
			client_id,
			client_secret,
			auth_url,
			token_url,
			redirect_uri,
			scope,
			provider,
		})
	}

	pub fn provider_name(&self) -> &str {
		&self.provider.name
	}

	/// The configured redirect URI, or `fallback` when none is configured.
	pub fn redirect_uri_or<'a>(&'a self, fallback: &'a str) -> &'a str {
		self.redirect_uri.as_deref().unwrap_or(fallback)
	}
}

fn parse_endpoint(provider: &str, field: &str, raw: &str) -> Result<Url, OAuthError> {
	Url::parse(raw)
		.map_err(|e| OAuthError::InvalidConfig(format!("{provider}: invalid {field} '{raw}': {e}")))
}
