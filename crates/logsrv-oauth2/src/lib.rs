// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth 2.0 support for logsrv.
//!
//! - [`OAuthProviderRegistry`]: name to provider metadata, filled at start-up
//! - [`OAuthConfig`]: a provider plus client credentials and scope
//! - [`start_flow`] / [`authenticate`]: the authorization code flow with
//!   cookie-echo CSRF state
//! - [`OAuthManager`]: the configured providers and the shared
//!   [`TokenExchanger`]
//!
//! # Security Considerations
//!
//! - Client secrets and access tokens are wrapped in
//!   [`SecretString`](logsrv_common_secret::SecretString).
//! - The `state` parameter is compared with the state cookie before any
//!   network call is made.

pub mod config;
pub mod error;
pub mod flow;
pub mod manager;
pub mod provider;
pub mod token;

pub use config::OAuthConfig;
pub use error::OAuthError;
pub use flow::{
	authenticate, start_flow, CallbackRequest, FlowStart, HttpTokenExchanger, TokenExchanger,
	STATE_COOKIE_MAX_AGE, STATE_COOKIE_NAME,
};
pub use manager::OAuthManager;
pub use provider::{OAuthProvider, OAuthProviderRegistry, UserInfoFetcher};
pub use token::{parse_token_response, TokenInfo};
