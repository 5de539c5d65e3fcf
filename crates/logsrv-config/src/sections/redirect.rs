// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post-login redirect configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RedirectConfigLayer {
	pub enabled: Option<bool>,
	pub query_parameter: Option<String>,
	pub check_referer: Option<bool>,
	/// File listing hosts (one per line) that absolute redirect targets may use.
	pub host_file: Option<PathBuf>,
}

impl RedirectConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.query_parameter.is_some() {
			self.query_parameter = other.query_parameter;
		}
		if other.check_referer.is_some() {
			self.check_referer = other.check_referer;
		}
		if other.host_file.is_some() {
			self.host_file = other.host_file;
		}
	}

	pub fn finalize(self) -> RedirectConfig {
		RedirectConfig {
			enabled: self.enabled.unwrap_or(true),
			query_parameter: self
				.query_parameter
				.filter(|p| !p.is_empty())
				.unwrap_or_else(|| "backTo".to_string()),
			check_referer: self.check_referer.unwrap_or(true),
			host_file: self.host_file.filter(|p| !p.as_os_str().is_empty()),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectConfig {
	pub enabled: bool,
	pub query_parameter: String,
	pub check_referer: bool,
	pub host_file: Option<PathBuf>,
}

impl Default for RedirectConfig {
	fn default() -> Self {
		RedirectConfigLayer::default().finalize()
	}
}
