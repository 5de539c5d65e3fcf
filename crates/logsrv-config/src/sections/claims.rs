// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Custom claims source configuration section.

use std::path::PathBuf;
use std::time::Duration;

use logsrv_common_secret::SecretString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClaimsConfigLayer {
	pub user_file: Option<PathBuf>,
	pub user_endpoint: Option<String>,
	pub user_endpoint_token: Option<SecretString>,
	#[serde(
		default,
		with = "crate::duration::option",
		skip_serializing_if = "Option::is_none"
	)]
	pub user_endpoint_timeout: Option<Duration>,
}

impl ClaimsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.user_file.is_some() {
			self.user_file = other.user_file;
		}
		if other.user_endpoint.is_some() {
			self.user_endpoint = other.user_endpoint;
		}
		if other.user_endpoint_token.is_some() {
			self.user_endpoint_token = other.user_endpoint_token;
		}
		if other.user_endpoint_timeout.is_some() {
			self.user_endpoint_timeout = other.user_endpoint_timeout;
		}
	}

	pub fn finalize(self) -> ClaimsConfig {
		ClaimsConfig {
			user_file: self.user_file.filter(|p| !p.as_os_str().is_empty()),
			user_endpoint: self.user_endpoint.filter(|u| !u.is_empty()),
			user_endpoint_token: self.user_endpoint_token.filter(|t| !t.is_empty()),
			user_endpoint_timeout: self
				.user_endpoint_timeout
				.unwrap_or(Duration::from_secs(5)),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimsConfig {
	pub user_file: Option<PathBuf>,
	pub user_endpoint: Option<String>,
	pub user_endpoint_token: Option<SecretString>,
	pub user_endpoint_timeout: Duration,
}

impl Default for ClaimsConfig {
	fn default() -> Self {
		ClaimsConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_no_source() {
		let config = ClaimsConfig::default();
		assert!(config.user_file.is_none());
		assert!(config.user_endpoint.is_none());
		assert!(config.user_endpoint_token.is_none());
		assert_eq!(config.user_endpoint_timeout, Duration::from_secs(5));
	}

	#[test]
	fn token_is_redacted_in_debug() {
		let config = ClaimsConfigLayer {
			user_endpoint: Some("https://claims.example.com".to_string()),
			user_endpoint_token: Some(SecretString::new("tok3n".to_string())),
			..Default::default()
		}
		.finalize();
		assert!(!format!("{config:?}").contains("tok3n"));
	}
}
