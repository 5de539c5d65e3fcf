// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth provider descriptors and their registry.
//!
//! The registry is filled by the composition root before the server starts
//! accepting requests and is only read afterwards. Registering a provider
//! once requests are being served is unsupported.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use logsrv_common_core::{Identity, ProviderDescription};
use tracing::{debug, warn};

use crate::error::OAuthError;
use crate::token::TokenInfo;

/// Turns an access token into an [`Identity`].
///
/// Implementations return the identity together with the raw response body
/// of the provider's user info endpoint.
#[async_trait]
pub trait UserInfoFetcher: Send + Sync {
	async fn fetch_user_info(&self, token: &TokenInfo) -> Result<(Identity, String), OAuthError>;
}

/// Static endpoint metadata of an identity provider.
#[derive(Clone)]
pub struct OAuthProvider {
	pub name: String,
	pub help_text: String,
	pub auth_url: String,
	pub token_url: String,
	/// Space separated scopes requested when the configuration sets none.
	pub default_scopes: String,
	pub user_info: Arc<dyn UserInfoFetcher>,
}

impl OAuthProvider {
	pub fn description(&self) -> ProviderDescription {
		ProviderDescription::new(&self.name, &self.help_text)
	}
}

impl fmt::Debug for OAuthProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OAuthProvider")
			.field("name", &self.name)
			.field("auth_url", &self.auth_url)
			.field("token_url", &self.token_url)
			.field("default_scopes", &self.default_scopes)
			.finish_non_exhaustive()
	}
}

/// Name to provider mapping.
#[derive(Debug, Default, Clone)]
pub struct OAuthProviderRegistry {
	providers: HashMap<String, Arc<OAuthProvider>>,
}

impl OAuthProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a provider under its name.
	///
	/// A provider already registered under the same name is replaced and
	/// returned; the replacement is logged at `warn`.
	pub fn register(&mut self, provider: OAuthProvider) -> Option<Arc<OAuthProvider>> {
		let name = provider.name.clone();
		let previous = self.providers.insert(name.clone(), Arc::new(provider));
		if previous.is_some() {
			warn!(provider = %name, "oauth provider registered twice, keeping the last registration");
		} else {
			debug!(provider = %name, "registered oauth provider");
		}
		previous
	}

	pub fn lookup(&self, name: &str) -> Option<Arc<OAuthProvider>> {
		self.providers.get(name).cloned()
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.providers.keys().cloned().collect();
		names.sort();
		names
	}

	pub fn descriptions(&self) -> Vec<ProviderDescription> {
		let mut descriptions: Vec<_> = self.providers.values().map(|p| p.description()).collect();
		descriptions.sort();
		descriptions
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::*;

	/// Returns a fixed identity for any token.
	pub struct StaticUserInfo(pub Identity);

	#[async_trait]
	impl UserInfoFetcher for StaticUserInfo {
		async fn fetch_user_info(&self, _token: &TokenInfo) -> Result<(Identity, String), OAuthError> {
			Ok((self.0.clone(), "{}".to_string()))
		}
	}

	pub fn provider(name: &str, auth_url: &str) -> OAuthProvider {
		OAuthProvider {
			name: name.to_string(),
			help_text: format!("{name} oauth"),
			auth_url: auth_url.to_string(),
			token_url: format!("{auth_url}/token"),
			default_scopes: "email".to_string(),
			user_info: Arc::new(StaticUserInfo(Identity::new("alice", name))),
		}
	}
}
