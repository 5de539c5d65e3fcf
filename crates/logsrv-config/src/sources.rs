// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files, environment variables and
//! command line flags.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::EnvLookup;
use crate::error::ConfigError;
use crate::layer::LogsrvConfigLayer;
use crate::options::parse_options;
use crate::sections::{
	ClaimsConfigLayer, CookieConfigLayer, HttpConfigLayer, JwtConfigLayer, LoggingConfigLayer,
	LoginConfigLayer, ProvidersConfigLayer, RedirectConfigLayer,
};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/logsrv/logsrv.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	CommandLine = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<LogsrvConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<LogsrvConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(LogsrvConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is skipped.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(DEFAULT_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<LogsrvConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(LogsrvConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: LogsrvConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `LOGSRV_<FIELD>`, plus `LOGSRV_<PROVIDER>=k=v,...` for each
/// provider name passed in through [`EnvSource::with_backends`] and
/// [`EnvSource::with_oauth_providers`].
pub struct EnvSource {
	env: EnvLookup,
	backends: Vec<String>,
	oauth: Vec<String>,
}

impl EnvSource {
	pub fn new(env: EnvLookup) -> Self {
		Self {
			env,
			backends: Vec::new(),
			oauth: Vec::new(),
		}
	}

	pub fn process() -> Self {
		Self::new(EnvLookup::process())
	}

	pub fn with_backends<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.backends = names.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_oauth_providers<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.oauth = names.into_iter().map(Into::into).collect();
		self
	}

	fn load_http(&self) -> Result<HttpConfigLayer, ConfigError> {
		Ok(HttpConfigLayer {
			host: self.env.var("LOGSRV_HOST"),
			port: self.env.parse("LOGSRV_PORT")?,
			grace_period: self.env.duration("LOGSRV_GRACE_PERIOD")?,
		})
	}

	fn load_logging(&self) -> LoggingConfigLayer {
		LoggingConfigLayer {
			level: self.env.var("LOGSRV_LOG_LEVEL"),
			text_logging: self.env.bool("LOGSRV_TEXT_LOGGING"),
		}
	}

	fn load_jwt(&self) -> Result<JwtConfigLayer, ConfigError> {
		Ok(JwtConfigLayer {
			secret: self.env.var("LOGSRV_JWT_SECRET").map(Into::into),
			secret_file: self.env.var("LOGSRV_JWT_SECRET_FILE").map(PathBuf::from),
			algo: self.env.var("LOGSRV_JWT_ALGO"),
			expiry: self.env.duration("LOGSRV_JWT_EXPIRY")?,
			refreshes: self.env.parse("LOGSRV_JWT_REFRESHES")?,
		})
	}

	fn load_login(&self) -> LoginConfigLayer {
		LoginConfigLayer {
			login_path: self.env.var("LOGSRV_LOGIN_PATH"),
			success_url: self.env.var("LOGSRV_SUCCESS_URL"),
			logout_url: self.env.var("LOGSRV_LOGOUT_URL"),
		}
	}

	fn load_redirect(&self) -> RedirectConfigLayer {
		RedirectConfigLayer {
			enabled: self.env.bool("LOGSRV_REDIRECT"),
			query_parameter: self.env.var("LOGSRV_REDIRECT_QUERY_PARAMETER"),
			check_referer: self.env.bool("LOGSRV_REDIRECT_CHECK_REFERER"),
			host_file: self.env.var("LOGSRV_REDIRECT_HOST_FILE").map(PathBuf::from),
		}
	}

	fn load_cookie(&self) -> Result<CookieConfigLayer, ConfigError> {
		Ok(CookieConfigLayer {
			name: self.env.var("LOGSRV_COOKIE_NAME"),
			expiry: self.env.duration("LOGSRV_COOKIE_EXPIRY")?,
			domain: self.env.var("LOGSRV_COOKIE_DOMAIN"),
			http_only: self.env.bool("LOGSRV_COOKIE_HTTP_ONLY"),
			secure: self.env.bool("LOGSRV_COOKIE_SECURE"),
		})
	}

	fn load_claims(&self) -> Result<ClaimsConfigLayer, ConfigError> {
		Ok(ClaimsConfigLayer {
			user_file: self.env.var("LOGSRV_USER_FILE").map(PathBuf::from),
			user_endpoint: self.env.var("LOGSRV_USER_ENDPOINT"),
			user_endpoint_token: self.env.secret("LOGSRV_USER_ENDPOINT_TOKEN")?,
			user_endpoint_timeout: self.env.duration("LOGSRV_USER_ENDPOINT_TIMEOUT")?,
		})
	}

	fn load_providers(&self) -> Result<ProvidersConfigLayer, ConfigError> {
		let mut layer = ProvidersConfigLayer::default();
		for name in &self.backends {
			if let Some(list) = self.env.var(&provider_env_var(name)) {
				layer.add_backend(name.clone(), parse_options(&list)?);
			}
		}
		for name in &self.oauth {
			if let Some(list) = self.env.var(&provider_env_var(name)) {
				layer.add_oauth(name.clone(), parse_options(&list)?);
			}
		}
		Ok(layer)
	}
}

/// `LOGSRV_<NAME>` with the provider name upper-cased and `-` mapped to `_`.
pub fn provider_env_var(provider: &str) -> String {
	format!("LOGSRV_{}", provider.to_uppercase().replace('-', "_"))
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<LogsrvConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(LogsrvConfigLayer {
			http: Some(self.load_http()?),
			logging: Some(self.load_logging()),
			jwt: Some(self.load_jwt()?),
			login: Some(self.load_login()),
			redirect: Some(self.load_redirect()),
			cookie: Some(self.load_cookie()?),
			claims: Some(self.load_claims()?),
			providers: Some(self.load_providers()?),
		})
	}
}

/// A pre-built layer, used for command line flags.
pub struct LayerSource {
	layer: LogsrvConfigLayer,
}

impl LayerSource {
	pub fn command_line(layer: LogsrvConfigLayer) -> Self {
		Self { layer }
	}
}

impl ConfigSource for LayerSource {
	fn name(&self) -> &'static str {
		"command-line"
	}

	fn precedence(&self) -> Precedence {
		Precedence::CommandLine
	}

	fn load(&self) -> Result<LogsrvConfigLayer, ConfigError> {
		Ok(self.layer.clone())
	}
}
