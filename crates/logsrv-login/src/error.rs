// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use logsrv_oauth2::OAuthError;
use thiserror::Error;

use crate::claims::ClaimsError;
use crate::token::TokenError;

/// Internal failure of a credential backend.
///
/// A wrong username or password is not an error; backends report it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum BackendError {
	#[error("invalid backend configuration: {0}")]
	Config(String),

	#[error("backend unavailable: {0}")]
	Unavailable(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Errors that prevent a [`LoginHandler`](crate::LoginHandler) from being built.
#[derive(Debug, Error)]
pub enum LoginError {
	#[error("no login backends or oauth provider configured")]
	NoProviders,

	#[error("no such backend provider: {0}")]
	UnknownBackend(String),

	#[error("backend {provider}: {source}")]
	Backend {
		provider: String,
		source: BackendError,
	},

	#[error(transparent)]
	OAuth(#[from] OAuthError),

	#[error(transparent)]
	Token(#[from] TokenError),

	#[error(transparent)]
	Claims(#[from] ClaimsError),

	#[error("failed to read redirect host file {path}: {source}")]
	RedirectHostFile {
		path: std::path::PathBuf,
		source: std::io::Error,
	},
}
