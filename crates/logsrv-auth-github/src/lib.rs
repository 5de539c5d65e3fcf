// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GitHub OAuth 2.0 provider for logsrv.
//!
//! Registers the GitHub authorize and token endpoints and maps the
//! `/user` API response onto an [`Identity`]:
//!
//! | GitHub field | identity field |
//! |---|---|
//! | `login` | `sub` |
//! | `name` | `name` |
//! | `email` | `email` |
//! | `avatar_url` | `picture` |
//!
//! # Example
//!
//! ```rust,no_run
//! use logsrv_oauth2::OAuthProviderRegistry;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = OAuthProviderRegistry::new();
//! registry.register(logsrv_auth_github::provider()?);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use logsrv_common_core::Identity;
use logsrv_oauth2::{OAuthError, OAuthProvider, TokenInfo, UserInfoFetcher};
use serde::{Deserialize, Serialize};

pub const PROVIDER_NAME: &str = "github";

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_API_URL: &str = "https://api.github.com";

/// User profile information from GitHub's `/user` API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
	/// The GitHub username.
	pub login: String,
	/// Display name (optional, may be null).
	pub name: Option<String>,
	/// Public email address (optional, may be null).
	pub email: Option<String>,
	/// Avatar image URL (optional, may be null).
	pub avatar_url: Option<String>,
}

impl GitHubUser {
	pub fn into_identity(self) -> Identity {
		let mut identity = Identity::new(self.login, PROVIDER_NAME);
		identity.name = self.name.filter(|n| !n.is_empty());
		identity.email = self.email.filter(|e| !e.is_empty());
		identity.picture = self.avatar_url.filter(|a| !a.is_empty());
		identity
	}
}

/// Fetches the authenticated user from the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubUserInfo {
	api_url: String,
	http_client: reqwest::Client,
}

impl GitHubUserInfo {
	pub fn new() -> Result<Self, OAuthError> {
		Self::with_api_url(GITHUB_API_URL)
	}

	/// Use a different API base URL, e.g. a GitHub Enterprise instance.
	pub fn with_api_url(api_url: impl Into<String>) -> Result<Self, OAuthError> {
		let http_client = logsrv_common_http::new_client()
			.map_err(|e| OAuthError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
		Ok(Self {
			api_url: api_url.into().trim_end_matches('/').to_string(),
			http_client,
		})
	}
}

#[async_trait]
impl UserInfoFetcher for GitHubUserInfo {
	#[tracing::instrument(skip(self, token), name = "GitHubUserInfo::fetch_user_info")]
	async fn fetch_user_info(&self, token: &TokenInfo) -> Result<(Identity, String), OAuthError> {
		tracing::debug!("fetching GitHub user info");

		let response = self
			.http_client
			.get(format!("{}/user", self.api_url))
			.header("Accept", "application/vnd.github+json")
			.header(
				"Authorization",
				format!("Bearer {}", token.access_token.expose()),
			)
			.header("X-GitHub-Api-Version", "2022-11-28")
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
				"GitHub returned {status} for user info"
			)));
		}

		let user: GitHubUser = serde_json::from_str(&body)
			.map_err(|e| OAuthError::UserInfo(format!("failed to parse user response: {e}")))?;

		Ok((user.into_identity(), body))
	}
}

/// The GitHub provider descriptor with the public API.
pub fn provider() -> Result<OAuthProvider, OAuthError> {
	provider_with(GitHubUserInfo::new()?)
}

pub fn provider_with(user_info: GitHubUserInfo) -> Result<OAuthProvider, OAuthError> {
	Ok(OAuthProvider {
		name: PROVIDER_NAME.to_string(),
		help_text: "GitHub OAuth opts: client_id=..,client_secret=..[,scope=..][,redirect_uri=..]"
			.to_string(),
		auth_url: GITHUB_AUTHORIZE_URL.to_string(),
		token_url: GITHUB_TOKEN_URL.to_string(),
		default_scopes: String::new(),
		user_info: Arc::new(user_info),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[test]
	fn github_user_deserializes() {
		let json = r#"{
            "id": 12345,
            "login": "testuser",
            "name": "Test User",
            "email": "test@example.com",
            "avatar_url": "https://avatars.githubusercontent.com/u/12345"
        }"#;

		let user: GitHubUser = serde_json::from_str(json).unwrap();
		assert_eq!(user.login, "testuser");
		assert_eq!(user.name, Some("Test User".to_string()));
	}

	#[test]
	fn github_user_deserializes_with_nulls() {
		let json = r#"{"login": "minimaluser", "name": null, "email": null, "avatar_url": null}"#;
		let identity = serde_json::from_str::<GitHubUser>(json)
			.unwrap()
			.into_identity();

		assert_eq!(identity.sub, "minimaluser");
		assert_eq!(identity.origin, PROVIDER_NAME);
		assert!(identity.name.is_none());
		assert!(identity.email.is_none());
		assert!(identity.picture.is_none());
	}

	#[test]
	fn provider_endpoints() {
		let provider = provider().unwrap();
		assert_eq!(provider.name, "github");
		assert_eq!(provider.auth_url, GITHUB_AUTHORIZE_URL);
		assert_eq!(provider.token_url, GITHUB_TOKEN_URL);
		assert!(provider.default_scopes.is_empty());
	}

	#[tokio::test]
	async fn fetches_and_maps_user() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/user"))
			.and(header("authorization", "Bearer gho_token"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"id": 1,
				"login": "octocat",
				"name": "The Octocat",
				"email": "octocat@github.com",
				"avatar_url": "https://avatars.githubusercontent.com/u/583231"
			})))
			.expect(1)
			.mount(&server)
			.await;

		let fetcher = GitHubUserInfo::with_api_url(server.uri()).unwrap();
		let (identity, raw) = fetcher
			.fetch_user_info(&TokenInfo::bearer("gho_token"))
			.await
			.unwrap();

		assert_eq!(identity.sub, "octocat");
		assert_eq!(identity.name.as_deref(), Some("The Octocat"));
		assert_eq!(identity.email.as_deref(), Some("octocat@github.com"));
		assert_eq!(
			identity.picture.as_deref(),
			Some("https://avatars.githubusercontent.com/u/583231")
		);
		assert!(raw.contains("octocat"));
	}

	#[tokio::test]
	async fn unauthorized_is_user_info_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/user"))
			.respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
			.mount(&server)
			.await;

		let fetcher = GitHubUserInfo::with_api_url(server.uri()).unwrap();
		let err = fetcher
			.fetch_user_info(&TokenInfo::bearer("expired"))
			.await
			.unwrap_err();
		assert!(matches!(err, OAuthError::UserInfo(_)));
	}

	#[tokio::test]
	async fn malformed_body_is_user_info_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/user"))
			.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
			.mount(&server)
			.await;

		let fetcher = GitHubUserInfo::with_api_url(server.uri()).unwrap();
		let err = fetcher
			.fetch_user_info(&TokenInfo::bearer("t"))
			.await
			.unwrap_err();
		assert!(matches!(err, OAuthError::UserInfo(_)));
	}
}
