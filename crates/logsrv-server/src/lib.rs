// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The logsrv HTTP server: provider registration, config loading, the
//! router and graceful shutdown.

pub mod cli;
pub mod page;
pub mod routes;

use std::time::Duration;

use axum::Router;
use logsrv_config::{
	load_config_from, ConfigError, ConfigSource, DefaultsSource, EnvSource, LayerSource,
	LoggingConfig, LogsrvConfig, TomlSource,
};
use logsrv_login::{BackendRegistry, LoginError};
use logsrv_oauth2::{OAuthError, OAuthProviderRegistry};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use cli::{Args, Command};
pub use routes::create_router;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("login setup failed: {0}")]
	Login(#[from] LoginError),

	#[error("OAuth provider setup failed: {0}")]
	OAuth(#[from] OAuthError),

	#[error("server I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// All built-in login backends.
pub fn backend_registry() -> BackendRegistry {
	let mut registry = BackendRegistry::new();
	logsrv_login::simple::register(&mut registry);
	logsrv_backend_htpasswd::register(&mut registry);
	registry
}

/// All built-in OAuth providers.
pub fn oauth_registry() -> Result<OAuthProviderRegistry, OAuthError> {
	let mut registry = OAuthProviderRegistry::new();
	registry.register(logsrv_auth_github::provider()?);
	registry.register(logsrv_auth_google::provider()?);
	Ok(registry)
}

/// Load config from defaults, the TOML file, the environment and the
/// command line, in increasing precedence.
pub fn load_config(
	args: &Args,
	backends: &BackendRegistry,
	oauth: &OAuthProviderRegistry,
) -> Result<LogsrvConfig, ConfigError> {
	let toml = match &args.config {
		Some(path) => TomlSource::new(path),
		None => TomlSource::system(),
	};
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(toml),
		Box::new(
			EnvSource::process()
				.with_backends(backends.names())
				.with_oauth_providers(oauth.names()),
		),
		Box::new(LayerSource::command_line(args.to_layer()?)),
	];
	load_config_from(sources)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
	let text = logging.text_logging;

	tracing_subscriber::registry()
		.with(filter)
		.with(text.then(|| fmt::layer()))
		.with((!text).then(|| fmt::layer().json()))
		.init();
}

/// Serve `app` until ctrl-c or SIGTERM, then give in-flight requests
/// `grace_period` to finish.
pub async fn serve(
	listener: TcpListener,
	app: Router,
	grace_period: Duration,
) -> Result<(), ServerError> {
	let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		shutdown_signal().await;
		let _ = signal_tx.send(());
	});
	let mut server = tokio::spawn(async move { server.await });

	tokio::select! {
		result = &mut server => return joined(result),
		_ = signal_rx => {}
	}

	info!(grace_period = ?grace_period, "shutting down, draining in-flight requests");
	match tokio::time::timeout(grace_period, &mut server).await {
		Ok(result) => joined(result),
		Err(_) => {
			warn!("grace period elapsed, dropping remaining connections");
			server.abort();
			Ok(())
		}
	}
}

fn joined(
	result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), ServerError> {
	match result {
		Ok(result) => Ok(result?),
		Err(e) => Err(ServerError::Io(std::io::Error::other(e))),
	}
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			error!(error = %e, "failed to listen for ctrl-c");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(e) => {
				error!(error = %e, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => info!("received ctrl-c"),
		_ = terminate => info!("received SIGTERM"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn registers_builtin_providers() {
		assert_eq!(backend_registry().names(), vec!["htpasswd", "simple"]);
		assert_eq!(oauth_registry().unwrap().names(), vec!["github", "google"]);
	}
}
