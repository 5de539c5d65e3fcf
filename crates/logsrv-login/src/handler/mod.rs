// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The login middleware.
//!
//! # Request Flow
//!
//! ```text
//! request ─► classify ─┬─ OAuthCallback ─► authenticate ─► issue ─► cookie + 302
//!                      ├─ Credentials ───► backends ──────► issue ─► cookie + 302
//!                      │                   (no username) ─► refresh
//!                      ├─ OAuthStart ────► 302 to provider + state cookie
//!                      ├─ Logout ────────► remove cookie + 303
//!                      ├─ LoginPage ─────► next (with CurrentIdentity)
//!                      └─ Other ─────────► next
//! ```
//!
//! Clients sending `Accept: application/jwt` get the token as the response
//! body instead of a cookie and redirect.
//!
//! All state is built once in [`LoginHandler::new`] and only read while
//! serving.

mod classify;
mod credentials;
mod response;

pub use classify::{classify, RequestKind};
pub use credentials::{Credentials, CredentialsError};
pub use response::JWT_CONTENT_TYPE;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::{ACCEPT, CONTENT_TYPE, HOST};
use http::request::Parts;
use http::{HeaderMap, StatusCode};
use logsrv_common_http::cookie::{self, extract_cookie, Cookie, SameSite};
use logsrv_config::{CookieConfig, LogsrvConfig};
use logsrv_oauth2::{
	CallbackRequest, OAuthManager, OAuthProviderRegistry, TokenExchanger, STATE_COOKIE_NAME,
};
use tracing::{debug, error, info, instrument, warn};

use crate::backend::{Backend, BackendRegistry};
use crate::claims::{self, Claims};
use crate::error::LoginError;
use crate::redirect::RedirectPolicy;
use crate::token::TokenIssuer;

/// Largest credential body accepted.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Verified claims of the caller's identity cookie, attached to login page
/// requests that carry one.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentIdentity(pub Claims);

pub struct LoginHandler {
	login_path: String,
	logout_url: Option<String>,
	backends: Vec<(String, Box<dyn Backend>)>,
	oauth: OAuthManager,
	issuer: TokenIssuer,
	redirect: RedirectPolicy,
	cookie: CookieConfig,
}

impl LoginHandler {
	/// Build every configured backend and OAuth provider.
	///
	/// Fails when nothing is configured, a provider name is not registered,
	/// or any provider rejects its options.
	pub fn new(
		config: &LogsrvConfig,
		backend_registry: &BackendRegistry,
		oauth_registry: &OAuthProviderRegistry,
		exchanger: Arc<dyn TokenExchanger>,
	) -> Result<Self, LoginError> {
		if config.providers.is_empty() {
			return Err(LoginError::NoProviders);
		}

		let mut backends = Vec::with_capacity(config.providers.backends.len());
		for (name, options) in &config.providers.backends {
			let factory = backend_registry
				.lookup(name)
				.ok_or_else(|| LoginError::UnknownBackend(name.clone()))?;
			let backend = factory(options).map_err(|source| LoginError::Backend {
				provider: name.clone(),
				source,
			})?;
			info!(provider = %name, "configured login backend");
			backends.push((name.clone(), backend));
		}

		let mut oauth = OAuthManager::new(exchanger);
		for (name, options) in &config.providers.oauth {
			oauth.add_config(oauth_registry, name, options)?;
		}

		let claims_source = claims::source_from_config(&config.claims)?;
		let issuer = TokenIssuer::new(&config.jwt, claims_source)?;
		let redirect = RedirectPolicy::new(&config.redirect, config.login.success_url.clone())?;

		Ok(Self {
			login_path: config.login.login_path.clone(),
			logout_url: config.login.logout_url.clone(),
			backends,
			oauth,
			issuer,
			redirect,
			cookie: config.cookie.clone(),
		})
	}

	pub fn login_path(&self) -> &str {
		&self.login_path
	}

	pub fn issuer(&self) -> &TokenIssuer {
		&self.issuer
	}

	/// Names of the configured backends, in the order they are tried.
	pub fn backend_names(&self) -> Vec<&str> {
		self.backends.iter().map(|(name, _)| name.as_str()).collect()
	}

	pub fn oauth_names(&self) -> Vec<String> {
		self.oauth.names()
	}

	/// Claims of a valid identity cookie, if the request has one.
	pub fn current_identity(&self, headers: &HeaderMap) -> Option<Claims> {
		let token = extract_cookie(headers, &self.cookie.name)?;
		match self.issuer.verify(&token) {
			Ok(claims) => Some(claims),
			Err(e) => {
				debug!(error = %e, "ignoring invalid identity cookie");
				None
			}
		}
	}

	async fn handle(&self, request: Request, next: Next) -> Response {
		let path = request.uri().path().to_string();
		let query = request.uri().query().map(str::to_string);
		let callback = CallbackRequest::from_parts(query.as_deref(), request.headers());

		let kind = classify(
			request.method(),
			&path,
			query.as_deref(),
			&self.login_path,
			&callback,
			|name| self.oauth.config(name).is_some(),
		);

		match kind {
			RequestKind::Other => next.run(request).await,
			RequestKind::LoginPage => self.login_page(request, next).await,
			RequestKind::Logout => self.logout(),
			RequestKind::Credentials => self.credentials(request).await,
			RequestKind::OAuthStart { provider } => {
				let (parts, _) = request.into_parts();
				self.oauth_start(&provider, &parts)
			}
			RequestKind::OAuthCallback { provider } => {
				let (parts, _) = request.into_parts();
				self.oauth_callback(&provider, &callback, &parts).await
			}
		}
	}

	async fn login_page(&self, mut request: Request, next: Next) -> Response {
		let host = request_host(request.headers());
		let capture = self.redirect.capture(
			request.method(),
			request.uri().query(),
			request.headers(),
			&host,
		);
		if let Some(claims) = self.current_identity(request.headers()) {
			request.extensions_mut().insert(CurrentIdentity(claims));
		}

		let mut response = next.run(request).await;
		if let Some(cookie) = capture {
			response::append_cookie(&mut response, &cookie);
		}
		response
	}

	fn logout(&self) -> Response {
		let target = self.logout_url.as_deref().unwrap_or(&self.login_path);
		info!("logout");
		let mut response = response::redirect(StatusCode::SEE_OTHER, target, &self.login_path);
		response::append_cookie(&mut response, &self.removal_cookie());
		response
	}

	#[instrument(skip_all)]
	async fn credentials(&self, request: Request) -> Response {
		let (parts, body) = request.into_parts();
		let host = request_host(&parts.headers);
		let content_type = parts
			.headers
			.get(CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);

		let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
			Ok(body) => body,
			Err(e) => {
				warn!(error = %e, "failed to read login body");
				return response::bad_request("Invalid login request");
			}
		};
		let credentials = match Credentials::parse(content_type.as_deref(), &body) {
			Ok(credentials) => credentials,
			Err(CredentialsError::UnsupportedContentType(ct)) => {
				info!(content_type = %ct, "unsupported login content type");
				return response::bad_request("Unsupported content type");
			}
			Err(CredentialsError::InvalidJson(e)) => {
				info!(error = %e, "invalid login JSON");
				return response::bad_request("Invalid login request");
			}
		};

		if credentials.logout {
			return self.logout();
		}
		if credentials.username.is_empty() {
			return self.refresh(&parts.headers, &host).await;
		}

		for (name, backend) in &self.backends {
			match backend
				.authenticate(&credentials.username, &credentials.password)
				.await
			{
				Ok(Some(identity)) => {
					info!(provider = %name, sub = %identity.sub, "login successful");
					let claims = self.issuer.issue_claims(&identity, 0).await;
					return self.respond_authenticated(&claims, &parts.headers, &host);
				}
				Ok(None) => {}
				Err(e) => {
					error!(provider = %name, error = %e, "login backend failed");
					return response::backend_unavailable();
				}
			}
		}

		info!(username = %credentials.username, "login failed");
		response::forbidden()
	}

	async fn refresh(&self, headers: &HeaderMap, host: &str) -> Response {
		let Some(token) = extract_cookie(headers, &self.cookie.name) else {
			info!("refresh requested without identity cookie");
			return response::forbidden();
		};
		let claims = match self.issuer.verify(&token) {
			Ok(claims) => claims,
			Err(e) => {
				info!(error = %e, "refresh refused, identity cookie invalid");
				return response::forbidden();
			}
		};
		match self.issuer.refresh(&claims).await {
			Ok(refreshed) => {
				info!(sub = %refreshed.sub, refs = refreshed.refs, "token refreshed");
				self.respond_authenticated(&refreshed, headers, host)
			}
			Err(e) => {
				info!(sub = %claims.sub, error = %e, "refresh refused");
				response::forbidden()
			}
		}
	}

	fn oauth_start(&self, provider: &str, request: &Parts) -> Response {
		let Some(config) = self.oauth.config(provider) else {
			return response::forbidden();
		};
		let host = request_host(&request.headers);
		let redirect_uri = callback_uri(&request.headers, &host, request.uri.path());

		let start = match self.oauth.start_flow(config, &redirect_uri) {
			Ok(start) => start,
			Err(e) => {
				error!(provider = %provider, error = %e, "failed to start oauth flow");
				return response::internal_error();
			}
		};

		let mut response =
			response::redirect(StatusCode::FOUND, &start.location, self.redirect.success_url());
		response::append_cookie(&mut response, &start.set_cookie);
		if let Some(cookie) = self.redirect.capture(
			&request.method,
			request.uri.query(),
			&request.headers,
			&host,
		) {
			response::append_cookie(&mut response, &cookie);
		}
		response
	}

	async fn oauth_callback(
		&self,
		provider: &str,
		callback: &CallbackRequest,
		request: &Parts,
	) -> Response {
		let Some(config) = self.oauth.config(provider) else {
			return response::forbidden();
		};
		let host = request_host(&request.headers);
		let redirect_uri = callback_uri(&request.headers, &host, request.uri.path());

		let mut response = match self.oauth.authenticate(config, callback, &redirect_uri).await {
			Ok(identity) => {
				info!(provider = %provider, sub = %identity.sub, "oauth login successful");
				let claims = self.issuer.issue_claims(&identity, 0).await;
				self.respond_authenticated(&claims, &request.headers, &host)
			}
			Err(e) => {
				warn!(provider = %provider, error = %e, "oauth login failed");
				response::forbidden()
			}
		};
		response::append_cookie(&mut response, &cookie::removal(STATE_COOKIE_NAME));
		response
	}

	fn respond_authenticated(&self, claims: &Claims, headers: &HeaderMap, host: &str) -> Response {
		let token = match self.issuer.sign(claims) {
			Ok(token) => token,
			Err(e) => {
				error!(error = %e, "failed to sign identity token");
				return response::internal_error();
			}
		};

		if wants_jwt(headers) {
			return response::jwt_body(token);
		}

		let target = self.redirect.target(headers, host);
		let mut response =
			response::redirect(StatusCode::FOUND, &target, self.redirect.success_url());
		response::append_cookie(&mut response, &self.identity_cookie(token));
		if self.redirect.has_cookie(headers) {
			response::append_cookie(&mut response, &self.redirect.clear_cookie());
		}
		response
	}

	fn identity_cookie(&self, token: String) -> Cookie<'static> {
		let mut builder = cookie::build(self.cookie.name.clone(), token)
			.http_only(self.cookie.http_only)
			.secure(self.cookie.secure)
			.same_site(SameSite::Lax);
		if let Some(domain) = &self.cookie.domain {
			builder = builder.domain(domain.clone());
		}
		if let Some(expiry) = self.cookie.expiry {
			builder = builder.max_age(cookie::max_age(expiry));
		}
		builder.build()
	}

	fn removal_cookie(&self) -> Cookie<'static> {
		let mut builder = cookie::build(self.cookie.name.clone(), "")
			.http_only(self.cookie.http_only)
			.secure(self.cookie.secure);
		if let Some(domain) = &self.cookie.domain {
			builder = builder.domain(domain.clone());
		}
		let mut removal = builder.build();
		removal.make_removal();
		removal
	}
}

impl std::fmt::Debug for LoginHandler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoginHandler")
			.field("login_path", &self.login_path)
			.field("backends", &self.backend_names())
			.field("oauth", &self.oauth.names())
			.field("issuer", &self.issuer)
			.finish()
	}
}

/// Axum middleware entry point; install with
/// `axum::middleware::from_fn_with_state(handler, login_middleware)`.
pub async fn login_middleware(
	State(handler): State<Arc<LoginHandler>>,
	request: Request,
	next: Next,
) -> Response {
	handler.handle(request, next).await
}

fn request_host(headers: &HeaderMap) -> String {
	headers
		.get(HOST)
		.and_then(|v| v.to_str().ok())
		.unwrap_or_default()
		.to_string()
}

/// `<scheme>://<host><path>` of the current request, honoring
/// `X-Forwarded-Proto`.
fn callback_uri(headers: &HeaderMap, host: &str, path: &str) -> String {
	let scheme = headers
		.get("x-forwarded-proto")
		.and_then(|v| v.to_str().ok())
		.filter(|proto| matches!(*proto, "http" | "https"))
		.unwrap_or("http");
	format!("{scheme}://{host}{path}")
}

fn wants_jwt(headers: &HeaderMap) -> bool {
	headers
		.get_all(ACCEPT)
		.iter()
		.filter_map(|v| v.to_str().ok())
		.flat_map(|v| v.split(','))
		.any(|v| {
			v.split(';')
				.next()
				.is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JWT_CONTENT_TYPE))
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderValue;

	#[test]
	fn accept_jwt_detection() {
		let mut headers = HeaderMap::new();
		assert!(!wants_jwt(&headers));

		headers.insert(ACCEPT, HeaderValue::from_static("text/html, application/jwt;q=0.9"));
		assert!(wants_jwt(&headers));

		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
		assert!(!wants_jwt(&headers));
	}

	#[test]
	fn callback_uri_uses_forwarded_proto() {
		let mut headers = HeaderMap::new();
		assert_eq!(
			callback_uri(&headers, "app.example.com", "/login/github"),
			"http://app.example.com/login/github"
		);

		headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
		assert_eq!(
			callback_uri(&headers, "app.example.com", "/login/github"),
			"https://app.example.com/login/github"
		);

		headers.insert("x-forwarded-proto", HeaderValue::from_static("gopher"));
		assert!(callback_uri(&headers, "h", "/p").starts_with("http://"));
	}
}
