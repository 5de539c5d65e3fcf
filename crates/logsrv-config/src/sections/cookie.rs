// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity cookie configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CookieConfigLayer {
	pub name: Option<String>,
	/// Cookie lifetime. Unset means a browser session cookie.
	#[serde(
		default,
		with = "crate::duration::option",
		skip_serializing_if = "Option::is_none"
	)]
	pub expiry: Option<Duration>,
	pub domain: Option<String>,
	pub http_only: Option<bool>,
	pub secure: Option<bool>,
}

impl CookieConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.name.is_some() {
			self.name = other.name;
		}
		if other.expiry.is_some() {
			self.expiry = other.expiry;
		}
		if other.domain.is_some() {
			self.domain = other.domain;
		}
		if other.http_only.is_some() {
			self.http_only = other.http_only;
		}
		if other.secure.is_some() {
			self.secure = other.secure;
		}
	}

	pub fn finalize(self) -> CookieConfig {
		CookieConfig {
			name: self
				.name
				.filter(|n| !n.is_empty())
				.unwrap_or_else(|| "jwt_token".to_string()),
			expiry: self.expiry.filter(|e| !e.is_zero()),
			domain: self.domain.filter(|d| !d.is_empty()),
			http_only: self.http_only.unwrap_or(true),
			secure: self.secure.unwrap_or(true),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct CookieConfig {
	pub name: String,
	pub expiry: Option<Duration>,
	pub domain: Option<String>,
	pub http_only: bool,
	pub secure: bool,
}

impl Default for CookieConfig {
	fn default() -> Self {
		CookieConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = CookieConfig::default();
		assert_eq!(config.name, "jwt_token");
		assert!(config.expiry.is_none());
		assert!(config.domain.is_none());
		assert!(config.http_only);
		assert!(config.secure);
	}

	#[test]
	fn parses_from_toml() {
		let layer: CookieConfigLayer = toml::from_str(
			r#"
			name = "auth"
			expiry = "1h"
			domain = "example.com"
			secure = false
			"#,
		)
		.unwrap();
		let config = layer.finalize();
		assert_eq!(config.name, "auth");
		assert_eq!(config.expiry, Some(Duration::from_secs(3600)));
		assert_eq!(config.domain.as_deref(), Some("example.com"));
		assert!(!config.secure);
		assert!(config.http_only);
	}
}
