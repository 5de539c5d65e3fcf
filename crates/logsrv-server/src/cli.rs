// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command line flags. Every flag is optional and only overrides the
//! config file and environment when given.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use logsrv_common_secret::SecretString;
use logsrv_config::{
	parse_provider_spec, ClaimsConfigLayer, ConfigError, CookieConfigLayer, HttpConfigLayer,
	JwtConfigLayer, LoggingConfigLayer, LoginConfigLayer, LogsrvConfigLayer,
	ProvidersConfigLayer, RedirectConfigLayer,
};

#[derive(Parser, Debug, Default)]
#[command(name = "logsrv", about = "Login server issuing signed identity tokens", version)]
pub struct Args {
	/// Path to the TOML config file.
	#[arg(long, env = "LOGSRV_CONFIG")]
	pub config: Option<PathBuf>,

	#[arg(long)]
	pub host: Option<String>,

	#[arg(long)]
	pub port: Option<u16>,

	/// Time to wait for in-flight requests on shutdown.
	#[arg(long, value_parser = humantime::parse_duration)]
	pub grace_period: Option<Duration>,

	/// Default log filter when RUST_LOG is unset.
	#[arg(long)]
	pub log_level: Option<String>,

	/// Log as plain text instead of JSON.
	#[arg(long)]
	pub text_logging: bool,

	#[arg(long)]
	pub jwt_secret: Option<String>,

	#[arg(long)]
	pub jwt_secret_file: Option<PathBuf>,

	#[arg(long)]
	pub jwt_algo: Option<String>,

	#[arg(long, value_parser = humantime::parse_duration)]
	pub jwt_expiry: Option<Duration>,

	/// How often a token may be refreshed before a new login is required.
	#[arg(long)]
	pub jwt_refreshes: Option<u32>,

	#[arg(long)]
	pub login_path: Option<String>,

	#[arg(long)]
	pub success_url: Option<String>,

	#[arg(long)]
	pub logout_url: Option<String>,

	#[arg(long)]
	pub cookie_name: Option<String>,

	#[arg(long, value_parser = humantime::parse_duration)]
	pub cookie_expiry: Option<Duration>,

	#[arg(long)]
	pub cookie_domain: Option<String>,

	#[arg(long)]
	pub cookie_http_only: Option<bool>,

	#[arg(long)]
	pub cookie_secure: Option<bool>,

	/// Honor the redirect target captured before login.
	#[arg(long)]
	pub redirect: Option<bool>,

	#[arg(long)]
	pub redirect_query_parameter: Option<String>,

	#[arg(long)]
	pub redirect_check_referer: Option<bool>,

	/// File of extra hosts allowed as absolute redirect targets.
	#[arg(long)]
	pub redirect_host_file: Option<PathBuf>,

	/// TOML file with per-user custom claims.
	#[arg(long)]
	pub user_file: Option<PathBuf>,

	/// Endpoint returning per-user custom claims.
	#[arg(long)]
	pub user_endpoint: Option<String>,

	#[arg(long)]
	pub user_endpoint_token: Option<String>,

	#[arg(long, value_parser = humantime::parse_duration)]
	pub user_endpoint_timeout: Option<Duration>,

	/// Login backend, e.g. `provider=htpasswd,file=/etc/logsrv/users`. Repeatable.
	#[arg(long = "backend", value_name = "SPEC")]
	pub backends: Vec<String>,

	/// OAuth provider, e.g. `provider=github,client_id=..,client_secret=..`. Repeatable.
	#[arg(long = "oauth", value_name = "SPEC")]
	pub oauth: Vec<String>,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// List the available login backends and OAuth providers.
	Providers,
}

impl Args {
	/// The command line as a config layer, applied on top of all other sources.
	pub fn to_layer(&self) -> Result<LogsrvConfigLayer, ConfigError> {
		let mut providers = ProvidersConfigLayer::default();
		for spec in &self.backends {
			let (name, options) = parse_provider_spec(spec)?;
			providers.add_backend(name, options);
		}
		for spec in &self.oauth {
			let (name, options) = parse_provider_spec(spec)?;
			providers.add_oauth(name, options);
		}

		Ok(LogsrvConfigLayer {
			http: Some(HttpConfigLayer {
				host: self.host.clone(),
				port: self.port,
				grace_period: self.grace_period,
			}),
			logging: Some(LoggingConfigLayer {
				level: self.log_level.clone(),
				text_logging: self.text_logging.then_some(true),
			}),
			jwt: Some(JwtConfigLayer {
				secret: self.jwt_secret.clone().map(SecretString::new),
				secret_file: self.jwt_secret_file.clone(),
				algo: self.jwt_algo.clone(),
				expiry: self.jwt_expiry,
				refreshes: self.jwt_refreshes,
			}),
			login: Some(LoginConfigLayer {
				login_path: self.login_path.clone(),
				success_url: self.success_url.clone(),
				logout_url: self.logout_url.clone(),
			}),
			redirect: Some(RedirectConfigLayer {
				enabled: self.redirect,
				query_parameter: self.redirect_query_parameter.clone(),
				check_referer: self.redirect_check_referer,
				host_file: self.redirect_host_file.clone(),
			}),
			cookie: Some(CookieConfigLayer {
				name: self.cookie_name.clone(),
				expiry: self.cookie_expiry,
				domain: self.cookie_domain.clone(),
				http_only: self.cookie_http_only,
				secure: self.cookie_secure,
			}),
			claims: Some(ClaimsConfigLayer {
				user_file: self.user_file.clone(),
				user_endpoint: self.user_endpoint.clone(),
				user_endpoint_token: self.user_endpoint_token.clone().map(SecretString::new),
				user_endpoint_timeout: self.user_endpoint_timeout,
			}),
			providers: Some(providers),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Args {
		Args::try_parse_from(std::iter::once("logsrv").chain(args.iter().copied())).unwrap()
	}

	#[test]
	fn unset_flags_leave_layer_empty() {
		let layer = parse(&[]).to_layer().unwrap();
		let http = layer.http.unwrap();
		assert!(http.host.is_none());
		assert!(http.port.is_none());
		assert!(layer.logging.unwrap().text_logging.is_none());
		assert!(layer.jwt.unwrap().secret.is_none());
		let providers = layer.providers.unwrap();
		assert!(providers.backends.is_none());
		assert!(providers.oauth.is_none());
	}

	#[test]
	fn repeated_provider_flags() {
		let args = parse(&[
			"--backend",
			"provider=simple,bob=secret",
			"--backend",
			"provider=htpasswd,file=/etc/users",
			"--oauth",
			"provider=github,client_id=id,client_secret=s",
		]);
		let providers = args.to_layer().unwrap().providers.unwrap();

		let backends = providers.backends.unwrap();
		assert_eq!(backends.len(), 2);
		assert_eq!(backends["simple"]["bob"], "secret");
		assert_eq!(backends["htpasswd"]["file"], "/etc/users");
		assert_eq!(providers.oauth.unwrap()["github"]["client_id"], "id");
	}

	#[test]
	fn backend_without_provider_is_rejected() {
		let args = parse(&["--backend", "bob=secret"]);
		assert!(args.to_layer().is_err());
	}

	#[test]
	fn durations_use_humantime() {
		let args = parse(&["--jwt-expiry", "2h", "--grace-period", "10s"]);
		let layer = args.to_layer().unwrap();
		assert_eq!(layer.jwt.unwrap().expiry, Some(Duration::from_secs(7200)));
		assert_eq!(layer.http.unwrap().grace_period, Some(Duration::from_secs(10)));
	}

	#[test]
	fn providers_subcommand() {
		let args = parse(&["providers"]);
		assert_eq!(args.command, Some(Command::Providers));
	}
}
