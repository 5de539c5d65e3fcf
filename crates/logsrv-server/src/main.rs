// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! logsrv server binary.

use std::sync::Arc;

use clap::Parser;
use logsrv_login::LoginHandler;
use logsrv_oauth2::HttpTokenExchanger;
use logsrv_server::{
	backend_registry, create_router, init_tracing, load_config, oauth_registry, serve, Args,
	Command,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Load .env file if present
	dotenvy::dotenv().ok();

	let args = Args::parse();
	let backends = backend_registry();
	let oauth = oauth_registry()?;

	if let Some(Command::Providers) = args.command {
		println!("Login backends:");
		for description in backends.descriptions() {
			println!("  {:<10} {}", description.name, description.help_text);
		}
		println!("OAuth providers:");
		for description in oauth.descriptions() {
			println!("  {:<10} {}", description.name, description.help_text);
		}
		return Ok(());
	}

	let config = load_config(&args, &backends, &oauth)?;
	init_tracing(&config.logging);

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		login_path = %config.login.login_path,
		jwt_algo = %config.jwt.algo,
		jwt_expiry = ?config.jwt.expiry,
		jwt_refreshes = config.jwt.refreshes,
		cookie = %config.cookie.name,
		redirect = config.redirect.enabled,
		"starting logsrv"
	);

	let handler = Arc::new(LoginHandler::new(
		&config,
		&backends,
		&oauth,
		Arc::new(HttpTokenExchanger::new()?),
	)?);
	tracing::info!(
		backends = ?handler.backend_names(),
		oauth = ?handler.oauth_names(),
		"login providers ready"
	);

	let app = create_router(handler);
	let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
	tracing::info!(addr = %config.socket_addr(), "listening");

	serve(listener, app, config.http.grace_period).await?;
	tracing::info!("logsrv stopped");
	Ok(())
}
