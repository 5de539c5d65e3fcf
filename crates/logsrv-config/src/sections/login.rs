// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login endpoint configuration section.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoginConfigLayer {
	pub login_path: Option<String>,
	pub success_url: Option<String>,
	pub logout_url: Option<String>,
}

impl LoginConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.login_path.is_some() {
			self.login_path = other.login_path;
		}
		if other.success_url.is_some() {
			self.success_url = other.success_url;
		}
		if other.logout_url.is_some() {
			self.logout_url = other.logout_url;
		}
	}

	pub fn finalize(self) -> Result<LoginConfig, ConfigError> {
		let login_path = self.login_path.unwrap_or_else(|| "/login".to_string());
		if !login_path.starts_with('/') || (login_path.len() > 1 && login_path.ends_with('/')) {
			return Err(ConfigError::InvalidValue {
				key: "login.login_path".to_string(),
				message: format!("'{login_path}' must start with '/' and not end with '/'"),
			});
		}

		Ok(LoginConfig {
			login_path,
			success_url: self.success_url.unwrap_or_else(|| "/".to_string()),
			logout_url: self.logout_url.filter(|u| !u.is_empty()),
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginConfig {
	pub login_path: String,
	pub success_url: String,
	/// Where to send the browser after logout. `None` returns to the login path.
	pub logout_url: Option<String>,
}

impl Default for LoginConfig {
	fn default() -> Self {
		Self {
			login_path: "/login".to_string(),
			success_url: "/".to_string(),
			logout_url: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = LoginConfigLayer::default().finalize().unwrap();
		assert_eq!(config, LoginConfig::default());
	}

	#[test]
	fn empty_logout_url_is_none() {
		let config = LoginConfigLayer {
			logout_url: Some(String::new()),
			..Default::default()
		}
		.finalize()
		.unwrap();
		assert!(config.logout_url.is_none());
	}

	#[test]
	fn login_path_must_be_absolute() {
		for bad in ["login", "/login/"] {
			let result = LoginConfigLayer {
				login_path: Some(bad.to_string()),
				..Default::default()
			}
			.finalize();
			assert!(result.is_err(), "{bad} should be rejected");
		}
	}
}
