// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for logsrv.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file,
//!   environment, command line)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`LOGSRV_*`)
//! - Provider option lists in `key1=value1,key2=value2` form
//!
//! # Usage
//!
//! ```ignore
//! use logsrv_config::{load_config_from, DefaultsSource, EnvSource, TomlSource};
//!
//! let config = load_config_from(vec![
//! 	Box::new(DefaultsSource),
//! 	Box::new(TomlSource::system()),
//! 	Box::new(EnvSource::process()),
//! ])?;
//! println!("listening on {}", config.socket_addr());
//! ```

mod duration;
pub mod env;
pub mod error;
pub mod layer;
pub mod options;
pub mod sections;
pub mod sources;

pub use env::EnvLookup;
pub use error::ConfigError;
pub use layer::LogsrvConfigLayer;
pub use options::{parse_options, parse_provider_spec, ProviderOptions, PROVIDER_KEY};
pub use sections::*;
pub use sources::{
	provider_env_var, ConfigSource, DefaultsSource, EnvSource, LayerSource, Precedence,
	TomlSource, DEFAULT_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved logsrv configuration.
#[derive(Debug, Clone)]
pub struct LogsrvConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub jwt: JwtConfig,
	pub login: LoginConfig,
	pub redirect: RedirectConfig,
	pub cookie: CookieConfig,
	pub claims: ClaimsConfig,
	pub providers: ProvidersConfig,
}

impl LogsrvConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from the given sources, applied in precedence order.
pub fn load_config_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<LogsrvConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LogsrvConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Resolve a merged layer into the final configuration.
pub fn finalize(layer: LogsrvConfigLayer) -> Result<LogsrvConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let jwt = layer.jwt.unwrap_or_default().finalize()?;
	let login = layer.login.unwrap_or_default().finalize()?;
	let redirect = layer.redirect.unwrap_or_default().finalize();
	let cookie = layer.cookie.unwrap_or_default().finalize();
	let claims = layer.claims.unwrap_or_default().finalize();
	let providers = layer.providers.unwrap_or_default().finalize();

	info!(
		host = %http.host,
		port = http.port,
		login_path = %login.login_path,
		jwt_algo = %jwt.algo,
		jwt_expiry = %humantime::format_duration(jwt.expiry),
		jwt_refreshes = jwt.refreshes,
		cookie_name = %cookie.name,
		redirect_enabled = redirect.enabled,
		backends = ?providers.backends.keys().collect::<Vec<_>>(),
		oauth = ?providers.oauth.keys().collect::<Vec<_>>(),
		user_file_configured = claims.user_file.is_some(),
		user_endpoint_configured = claims.user_endpoint.is_some(),
		"logsrv configuration loaded"
	);

	Ok(LogsrvConfig {
		http,
		logging,
		jwt,
		login,
		redirect,
		cookie,
		claims,
		providers,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	fn env(pairs: &[(&str, &str)]) -> EnvSource {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		EnvSource::new(EnvLookup::from_fn(move |name| map.get(name).cloned()))
	}

	#[test]
	fn defaults_only() {
		let config = load_config_from(vec![Box::new(DefaultsSource)]).unwrap();
		assert_eq!(config.socket_addr(), "localhost:6789");
		assert_eq!(config.login.login_path, "/login");
		assert_eq!(config.cookie.name, "jwt_token");
		assert!(config.providers.is_empty());
	}

	#[test]
	fn precedence_is_file_then_env_then_cli() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[http]\nhost = \"file-host\"\nport = 1000\n\n[login]\nsuccess_url = \"/from-file\""
		)
		.unwrap();

		let cli = LogsrvConfigLayer {
			http: Some(HttpConfigLayer {
				port: Some(3000),
				..Default::default()
			}),
			..Default::default()
		};

		// Deliberately out of order; load_config_from sorts by precedence.
		let config = load_config_from(vec![
			Box::new(LayerSource::command_line(cli)),
			Box::new(env(&[("LOGSRV_PORT", "2000"), ("LOGSRV_HOST", "env-host")])),
			Box::new(TomlSource::new(file.path())),
			Box::new(DefaultsSource),
		])
		.unwrap();

		assert_eq!(config.http.host, "env-host");
		assert_eq!(config.http.port, 3000);
		assert_eq!(config.login.success_url, "/from-file");
	}

	#[test]
	fn source_error_aborts_loading() {
		let result = load_config_from(vec![
			Box::new(DefaultsSource),
			Box::new(env(&[("LOGSRV_JWT_EXPIRY", "forever")])),
		]);
		assert!(result.is_err());
	}
}
