// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Timeout applied to every server-to-server call unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a new HTTP client builder with the standard logsrv User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = logsrv_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client with a bounded request timeout and the standard User-Agent.
///
/// Every call made from a request path (token exchange, user info, claims
/// lookup) goes through a client built here so a slow upstream cannot hold a
/// request open indefinitely.
pub fn new_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
	builder().timeout(timeout).build()
}

/// Creates a new HTTP client with [`DEFAULT_TIMEOUT`].
pub fn new_client() -> Result<Client, reqwest::Error> {
	new_client_with_timeout(DEFAULT_TIMEOUT)
}

/// Returns the standard logsrv User-Agent string.
///
/// Format: `logsrv/{version}`
pub fn user_agent() -> String {
	format!("logsrv/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_correct_format() {
		let ua = user_agent();
		assert!(ua.starts_with("logsrv/"));
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[1], env!("CARGO_PKG_VERSION"));
	}

	#[test]
	fn client_with_timeout_builds() {
		assert!(new_client_with_timeout(Duration::from_millis(250)).is_ok());
		assert!(new_client().is_ok());
	}
}
