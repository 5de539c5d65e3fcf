// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configured credential backends and OAuth providers.
//!
//! ```toml
//! [providers.backends.simple]
//! bob = "secret"
//!
//! [providers.oauth.github]
//! client_id = "..."
//! client_secret = "..."
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::options::ProviderOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProvidersConfigLayer {
	pub backends: Option<BTreeMap<String, ProviderOptions>>,
	pub oauth: Option<BTreeMap<String, ProviderOptions>>,
}

impl ProvidersConfigLayer {
	pub fn add_backend(&mut self, name: impl Into<String>, options: ProviderOptions) {
		self.backends
			.get_or_insert_with(BTreeMap::new)
			.insert(name.into(), options);
	}

	pub fn add_oauth(&mut self, name: impl Into<String>, options: ProviderOptions) {
		self.oauth
			.get_or_insert_with(BTreeMap::new)
			.insert(name.into(), options);
	}

	/// Provider entries from `other` replace entries of the same name.
	pub fn merge(&mut self, other: Self) {
		for (name, options) in other.backends.into_iter().flatten() {
			self.add_backend(name, options);
		}
		for (name, options) in other.oauth.into_iter().flatten() {
			self.add_oauth(name, options);
		}
	}

	pub fn finalize(self) -> ProvidersConfig {
		ProvidersConfig {
			backends: self.backends.unwrap_or_default(),
			oauth: self.oauth.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
	pub backends: BTreeMap<String, ProviderOptions>,
	pub oauth: BTreeMap<String, ProviderOptions>,
}

impl ProvidersConfig {
	pub fn is_empty(&self) -> bool {
		self.backends.is_empty() && self.oauth.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn opts(pairs: &[(&str, &str)]) -> ProviderOptions {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn parses_nested_tables() {
		let layer: ProvidersConfigLayer = toml::from_str(
			r#"
			[backends.simple]
			bob = "secret"

			[oauth.github]
			client_id = "id"
			client_secret = "s3cret"
			"#,
		)
		.unwrap();
		let config = layer.finalize();
		assert_eq!(config.backends["simple"], opts(&[("bob", "secret")]));
		assert_eq!(config.oauth["github"]["client_id"], "id");
	}

	#[test]
	fn merge_replaces_same_provider_and_keeps_others() {
		let mut base = ProvidersConfigLayer::default();
		base.add_backend("simple", opts(&[("bob", "old")]));
		base.add_backend("htpasswd", opts(&[("file", "/etc/htpasswd")]));

		let mut overlay = ProvidersConfigLayer::default();
		overlay.add_backend("simple", opts(&[("alice", "new")]));
		base.merge(overlay);

		let config = base.finalize();
		assert_eq!(config.backends["simple"], opts(&[("alice", "new")]));
		assert!(config.backends.contains_key("htpasswd"));
	}

	#[test]
	fn empty_when_nothing_configured() {
		assert!(ProvidersConfigLayer::default().finalize().is_empty());
	}
}
