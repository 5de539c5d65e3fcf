// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Table of configured providers plus the token exchanger they share.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use logsrv_common_core::Identity;
use tracing::{debug, info, instrument};

use crate::config::OAuthConfig;
use crate::error::OAuthError;
use crate::flow::{self, CallbackRequest, FlowStart, TokenExchanger};
use crate::provider::OAuthProviderRegistry;

/// Configured OAuth providers, keyed by provider name.
///
/// Filled at start-up with [`OAuthManager::add_config`], read concurrently
/// afterwards.
pub struct OAuthManager {
	configs: HashMap<String, OAuthConfig>,
	exchanger: Arc<dyn TokenExchanger>,
}

impl OAuthManager {
	pub fn new(exchanger: Arc<dyn TokenExchanger>) -> Self {
		Self {
			configs: HashMap::new(),
			exchanger,
		}
	}

	/// Resolve `provider_name` in `registry` and store its configuration.
	///
	/// Adding the same provider twice replaces the earlier configuration.
	pub fn add_config(
		&mut self,
		registry: &OAuthProviderRegistry,
		provider_name: &str,
		options: &BTreeMap<String, String>,
	) -> Result<(), OAuthError> {
		let provider = registry
			.lookup(provider_name)
			.ok_or_else(|| OAuthError::UnknownProvider(provider_name.to_string()))?;
		let config = OAuthConfig::from_options(provider, options)?;

		info!(provider = %provider_name, scope = %config.scope, "configured oauth provider");
		self.configs.insert(provider_name.to_string(), config);
		Ok(())
	}

	pub fn config(&self, provider_name: &str) -> Option<&OAuthConfig> {
		self.configs.get(provider_name)
	}

	/// The configuration addressed by `<login_path>/<provider>`, if any.
	pub fn config_for_path(&self, login_path: &str, path: &str) -> Option<&OAuthConfig> {
		let rest = path.strip_prefix(login_path)?.strip_prefix('/')?;
		if rest.is_empty() || rest.contains('/') {
			return None;
		}
		self.configs.get(rest)
	}

	pub fn is_empty(&self) -> bool {
		self.configs.is_empty()
	}

	/// Configured provider names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.configs.keys().cloned().collect();
		names.sort();
		names
	}

	pub fn start_flow(&self, config: &OAuthConfig, redirect_uri: &str) -> Result<FlowStart, OAuthError> {
		flow::start_flow(config, redirect_uri)
	}

	/// Run the callback leg and fetch the user's identity.
	///
	/// The returned identity's origin is always the provider name.
	#[instrument(skip_all, fields(provider = %config.provider_name()))]
	pub async fn authenticate(
		&self,
		config: &OAuthConfig,
		request: &CallbackRequest,
		redirect_uri: &str,
	) -> Result<Identity, OAuthError> {
		let token = flow::authenticate(config, request, redirect_uri, self.exchanger.as_ref()).await?;
		let (mut identity, _raw) = config.provider.user_info.fetch_user_info(&token).await?;

		identity.origin = config.provider_name().to_string();
		identity
			.validate()
			.map_err(|e| OAuthError::UserInfo(e.to_string()))?;

		debug!(sub = %identity.sub, "oauth user authenticated");
		Ok(identity)
	}
}
