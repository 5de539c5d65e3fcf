// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Google OAuth 2.0 provider for logsrv.
//!
//! The identity subject is the user's verified email address. Accounts that
//! belong to a Google Workspace carry their hosted domain (`hd`) in
//! [`Identity::domain`], which claims sources can match on.
//!
//! Unverified email addresses are rejected.

use std::sync::Arc;

use async_trait::async_trait;
use logsrv_common_core::Identity;
use logsrv_oauth2::{OAuthError, OAuthProvider, TokenInfo, UserInfoFetcher};
use serde::{Deserialize, Serialize};

pub const PROVIDER_NAME: &str = "google";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const GOOGLE_DEFAULT_SCOPES: &str = "email";

/// Response of Google's OpenID Connect userinfo endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUser {
	pub sub: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub email_verified: bool,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub picture: Option<String>,
	/// Hosted domain of a Google Workspace account.
	#[serde(default)]
	pub hd: Option<String>,
}

impl GoogleUser {
	pub fn into_identity(self) -> Result<Identity, OAuthError> {
		let email = self
			.email
			.filter(|e| !e.is_empty())
			.ok_or_else(|| OAuthError::UserInfo("google account has no email".to_string()))?;
		if !self.email_verified {
			return Err(OAuthError::UserInfo(format!(
				"google email {email} is not verified"
			)));
		}

		let mut identity = Identity::new(email.clone(), PROVIDER_NAME).with_email(email);
		identity.name = self.name.filter(|n| !n.is_empty());
		identity.picture = self.picture.filter(|p| !p.is_empty());
		identity.domain = self.hd.filter(|d| !d.is_empty());
		Ok(identity)
	}
}

/// Fetches the authenticated user from Google's userinfo endpoint.
#[derive(Debug, Clone)]
pub struct GoogleUserInfo {
	userinfo_url: String,
	http_client: reqwest::Client,
}

impl GoogleUserInfo {
	pub fn new() -> Result<Self, OAuthError> {
		Self::with_userinfo_url(GOOGLE_USERINFO_URL)
	}

	pub fn with_userinfo_url(userinfo_url: impl Into<String>) -> Result<Self, OAuthError> {
		let http_client = logsrv_common_http::new_client()
			.map_err(|e| OAuthError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
		Ok(Self {
			userinfo_url: userinfo_url.into(),
			http_client,
		})
	}
}

#[async_trait]
impl UserInfoFetcher for GoogleUserInfo {
	#[tracing::instrument(skip(self, token), name = "GoogleUserInfo::fetch_user_info")]
	async fn fetch_user_info(&self, token: &TokenInfo) -> Result<(Identity, String), OAuthError> {
		tracing::debug!("fetching Google user info");

		let response = self
			.http_client
			.get(&self.userinfo_url)
			.header(
				"Authorization",
				format!("Bearer {}", token.access_token.expose()),
			)
			.send()
			.await
			.map_err(|e| OAuthError::UserInfo(format!("request failed: {e}")))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| OAuthError::UserInfo(format!("failed to read response: {e}")))?;

		if !status.is_success() {
			return Err(OAuthError::UserInfo(format!(
				"Google returned {status} for user info"
			)));
		}

		let user: GoogleUser = serde_json::from_str(&body)
			.map_err(|e| OAuthError::UserInfo(format!("failed to parse userinfo response: {e}")))?;

		Ok((user.into_identity()?, body))
	}
}

/// The Google provider descriptor.
pub fn provider() -> Result<OAuthProvider, OAuthError> {
	provider_with(GoogleUserInfo::new()?)
}

pub fn provider_with(user_info: GoogleUserInfo) -> Result<OAuthProvider, OAuthError> {
	Ok(OAuthProvider {
		name: PROVIDER_NAME.to_string(),
		help_text: "Google OAuth opts: client_id=..,client_secret=..[,scope=..][,redirect_uri=..]"
			.to_string(),
		auth_url: GOOGLE_AUTH_URL.to_string(),
		token_url: GOOGLE_TOKEN_URL.to_string(),
		default_scopes: GOOGLE_DEFAULT_SCOPES.to_string(),
		user_info: Arc::new(user_info),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[test]
	fn verified_user_maps_to_identity() {
		let user: GoogleUser = serde_json::from_str(
			r#"{
				"sub": "1234567890",
				"email": "alice@example.com",
				"email_verified": true,
				"name": "Alice",
				"picture": "https://lh3.googleusercontent.com/a/photo.jpg",
				"hd": "example.com"
			}"#,
		)
		.unwrap();

		let identity = user.into_identity().unwrap();
		assert_eq!(identity.sub, "alice@example.com");
		assert_eq!(identity.origin, "google");
		assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
		assert_eq!(identity.domain.as_deref(), Some("example.com"));
		assert_eq!(identity.name.as_deref(), Some("Alice"));
	}

	#[test]
	fn unverified_email_is_rejected() {
		let user: GoogleUser =
			serde_json::from_str(r#"{"sub": "1", "email": "bob@example.com"}"#).unwrap();
		assert!(matches!(user.into_identity(), Err(OAuthError::UserInfo(_))));
	}

	#[test]
	fn missing_email_is_rejected() {
		let user: GoogleUser =
			serde_json::from_str(r#"{"sub": "1", "email_verified": true}"#).unwrap();
		assert!(user.into_identity().is_err());
	}

	#[test]
	fn provider_endpoints() {
		let provider = provider().unwrap();
		assert_eq!(provider.name, "google");
		assert_eq!(provider.auth_url, GOOGLE_AUTH_URL);
		assert_eq!(provider.token_url, GOOGLE_TOKEN_URL);
		assert_eq!(provider.default_scopes, "email");
	}

	#[tokio::test]
	async fn fetches_userinfo_with_bearer_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/oauth2/v3/userinfo"))
			.and(header("authorization", "Bearer ya29.token"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"sub": "42",
				"email": "carol@corp.example",
				"email_verified": true,
				"hd": "corp.example"
			})))
			.expect(1)
			.mount(&server)
			.await;

		let fetcher =
			GoogleUserInfo::with_userinfo_url(format!("{}/oauth2/v3/userinfo", server.uri())).unwrap();
		let (identity, raw) = fetcher
			.fetch_user_info(&TokenInfo::bearer("ya29.token"))
			.await
			.unwrap();

		assert_eq!(identity.sub, "carol@corp.example");
		assert_eq!(identity.domain.as_deref(), Some("corp.example"));
		assert!(raw.contains("corp.example"));
	}

	#[tokio::test]
	async fn error_status_is_user_info_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(403))
			.mount(&server)
			.await;

		let fetcher = GoogleUserInfo::with_userinfo_url(server.uri()).unwrap();
		let err = fetcher
			.fetch_user_info(&TokenInfo::bearer("t"))
			.await
			.unwrap_err();
		assert!(matches!(err, OAuthError::UserInfo(_)));
	}
}
