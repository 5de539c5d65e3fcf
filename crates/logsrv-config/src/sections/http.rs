// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP listener configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpConfigLayer {
	pub host: Option<String>,
	pub port: Option<u16>,
	/// How long in-flight requests may run after a shutdown signal.
	#[serde(
		default,
		with = "crate::duration::option",
		skip_serializing_if = "Option::is_none"
	)]
	pub grace_period: Option<Duration>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.grace_period.is_some() {
			self.grace_period = other.grace_period;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		let defaults = HttpConfig::default();
		HttpConfig {
			host: self.host.unwrap_or(defaults.host),
			port: self.port.unwrap_or(defaults.port),
			grace_period: self.grace_period.unwrap_or(defaults.grace_period),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	pub grace_period: Duration,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: "localhost".to_string(),
			port: 6789,
			grace_period: Duration::from_secs(5),
		}
	}
}
