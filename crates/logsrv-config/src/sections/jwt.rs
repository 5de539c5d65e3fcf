// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token signing configuration section.

use std::path::PathBuf;
use std::time::Duration;

use logsrv_common_secret::SecretString;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

const GENERATED_SECRET_BYTES: usize = 64;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JwtConfigLayer {
	pub secret: Option<SecretString>,
	/// File holding the signing secret. Overrides `secret` when set.
	pub secret_file: Option<PathBuf>,
	pub algo: Option<String>,
	#[serde(
		default,
		with = "crate::duration::option",
		skip_serializing_if = "Option::is_none"
	)]
	pub expiry: Option<Duration>,
	/// Maximum number of sliding refreshes per issued token.
	pub refreshes: Option<u32>,
}

impl JwtConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.secret.is_some() {
			self.secret = other.secret;
		}
		if other.secret_file.is_some() {
			self.secret_file = other.secret_file;
		}
		if other.algo.is_some() {
			self.algo = other.algo;
		}
		if other.expiry.is_some() {
			self.expiry = other.expiry;
		}
		if other.refreshes.is_some() {
			self.refreshes = other.refreshes;
		}
	}

	/// Resolve the signing secret and apply defaults.
	///
	/// The secret file is read verbatim. Without any secret a random one is
	/// generated, which means tokens do not survive a restart.
	pub fn finalize(self) -> Result<JwtConfig, ConfigError> {
		let secret = match (self.secret_file, self.secret) {
			(Some(path), _) => {
				let content = std::fs::read_to_string(&path).map_err(|e| {
					ConfigError::Secret(format!(
						"failed to read jwt secret file {}: {e}",
						path.display()
					))
				})?;
				SecretString::new(content)
			}
			(None, Some(secret)) => secret,
			(None, None) => {
				warn!("no jwt secret configured, generating a random one");
				generate_secret()?
			}
		};

		let expiry = self.expiry.unwrap_or(Duration::from_secs(24 * 60 * 60));
		if expiry.is_zero() {
			return Err(ConfigError::Validation(
				"jwt.expiry must be greater than zero".to_string(),
			));
		}

		Ok(JwtConfig {
			secret,
			algo: self.algo.unwrap_or_else(|| "HS512".to_string()),
			expiry,
			refreshes: self.refreshes.unwrap_or(0),
		})
	}
}

fn generate_secret() -> Result<SecretString, ConfigError> {
	let mut bytes = [0u8; GENERATED_SECRET_BYTES];
	rand::rngs::OsRng
		.try_fill_bytes(&mut bytes)
		.map_err(|e| ConfigError::Secret(format!("failed to generate jwt secret: {e}")))?;
	Ok(SecretString::new(hex::encode(bytes)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct JwtConfig {
	pub secret: SecretString,
	pub algo: String,
	pub expiry: Duration,
	pub refreshes: u32,
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn defaults_generate_random_secret() {
		let a = JwtConfigLayer::default().finalize().unwrap();
		let b = JwtConfigLayer::default().finalize().unwrap();
		assert_eq!(a.secret.expose().len(), GENERATED_SECRET_BYTES * 2);
		assert_ne!(a.secret.expose(), b.secret.expose());
		assert_eq!(a.algo, "HS512");
		assert_eq!(a.expiry, Duration::from_secs(86400));
		assert_eq!(a.refreshes, 0);
	}

	#[test]
	fn secret_file_overrides_secret() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"file-secret\n").unwrap();

		let config = JwtConfigLayer {
			secret: Some(SecretString::new("inline".to_string())),
			secret_file: Some(file.path().to_path_buf()),
			..Default::default()
		}
		.finalize()
		.unwrap();

		assert_eq!(config.secret.expose(), "file-secret\n");
	}

	#[test]
	fn unreadable_secret_file_is_error() {
		let result = JwtConfigLayer {
			secret_file: Some(PathBuf::from("/nonexistent/logsrv/jwt.key")),
			..Default::default()
		}
		.finalize();
		assert!(matches!(result, Err(ConfigError::Secret(_))));
	}

	#[test]
	fn zero_expiry_is_rejected() {
		let result = JwtConfigLayer {
			secret: Some(SecretString::new("s".to_string())),
			expiry: Some(Duration::ZERO),
			..Default::default()
		}
		.finalize();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn parses_from_toml() {
		let layer: JwtConfigLayer = toml::from_str(
			r#"
			secret = "abc"
			algo = "HS256"
			expiry = "2h"
			refreshes = 3
			"#,
		)
		.unwrap();
		let config = layer.finalize().unwrap();
		assert_eq!(config.secret.expose(), "abc");
		assert_eq!(config.algo, "HS256");
		assert_eq!(config.expiry, Duration::from_secs(7200));
		assert_eq!(config.refreshes, 3);
	}
}
