// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	pub level: Option<String>,
	/// Human readable output instead of JSON lines.
	pub text_logging: Option<bool>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.text_logging.is_some() {
			self.text_logging = other.text_logging;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| "info".to_string()),
			text_logging: self.text_logging.unwrap_or(false),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
	pub level: String,
	pub text_logging: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_json_at_info() {
		let config = LoggingConfig::default();
		assert_eq!(config.level, "info");
		assert!(!config.text_logging);
	}

	#[test]
	fn merge_overwrites() {
		let mut base = LoggingConfigLayer {
			level: Some("debug".to_string()),
			text_logging: None,
		};
		base.merge(LoggingConfigLayer {
			level: None,
			text_logging: Some(true),
		});
		let config = base.finalize();
		assert_eq!(config.level, "debug");
		assert!(config.text_logging);
	}
}
