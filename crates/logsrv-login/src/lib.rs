// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication orchestration for logsrv.
//!
//! - [`BackendRegistry`] / [`Backend`]: username/password backends, built
//!   from provider options by registered factories
//! - [`TokenIssuer`]: claim assembly, signing, verification and sliding
//!   refresh
//! - [`ClaimsSource`]: optional custom claims from a file or an endpoint
//! - [`RedirectPolicy`]: post-login redirect targets
//! - [`LoginHandler`] / [`login_middleware`]: the per-request state machine,
//!   installed as axum middleware
//!
//! # Example
//!
//! ```ignore
//! let mut backends = BackendRegistry::new();
//! logsrv_login::simple::register(&mut backends);
//!
//! let handler = Arc::new(LoginHandler::new(&config, &backends, &oauth, exchanger)?);
//! let app = Router::new()
//! 	.route("/login", get(login_page))
//! 	.layer(axum::middleware::from_fn_with_state(handler, login_middleware));
//! ```

pub mod backend;
pub mod claims;
pub mod error;
pub mod handler;
pub mod redirect;
pub mod simple;
pub mod token;

pub use backend::{Backend, BackendFactory, BackendRegistry};
pub use claims::{
	source_from_config, Claims, ClaimsError, ClaimsSource, CustomClaims, EndpointClaimsSource,
	FileClaimsSource,
};
pub use error::{BackendError, LoginError};
pub use handler::{login_middleware, CurrentIdentity, LoginHandler, JWT_CONTENT_TYPE};
pub use redirect::RedirectPolicy;
pub use token::{TokenError, TokenIssuer};
