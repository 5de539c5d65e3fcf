// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Errors that can occur while configuring or running an OAuth flow.
///
/// [`OAuthError::UnknownProvider`], [`OAuthError::MissingParameter`] and
/// [`OAuthError::InvalidConfig`] are configuration errors raised at start-up.
/// Everything else is a per-request protocol error.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
	/// No OAuth provider is registered under this name.
	#[error("no such oauth provider: {0}")]
	UnknownProvider(String),

	/// A required option is missing from the provider configuration.
	#[error("missing parameter '{parameter}' for oauth provider {provider}")]
	MissingParameter { provider: String, parameter: String },

	/// An option or endpoint URL is present but unusable.
	#[error("invalid oauth configuration: {0}")]
	InvalidConfig(String),

	/// The system random number generator failed.
	#[error("failed to generate oauth state: {0}")]
	Random(String),

	/// The identity provider reported an error.
	#[error("oauth provider returned error: {0}")]
	ProviderError(String),

	/// The `state` parameter does not match the state cookie.
	#[error("oauth state mismatch")]
	StateMismatch,

	/// The callback carries no authorization code.
	#[error("no oauth authorization code in callback")]
	MissingCode,

	/// Exchanging the authorization code for an access token failed.
	#[error("oauth token exchange failed: {0}")]
	TokenExchangeFailed(String),

	/// Fetching or interpreting the user profile failed.
	#[error("failed to fetch oauth user info: {0}")]
	UserInfo(String),
}

impl OAuthError {
	/// Whether this error can only happen while building the configuration.
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			OAuthError::UnknownProvider(_)
				| OAuthError::MissingParameter { .. }
				| OAuthError::InvalidConfig(_)
		)
	}
}
