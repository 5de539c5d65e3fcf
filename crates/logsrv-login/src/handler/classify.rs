// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request routing decision of the login middleware.

use http::Method;
use logsrv_oauth2::CallbackRequest;

/// What the middleware does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
	/// `<login_path>/<provider>` carrying `code` or `error`.
	OAuthCallback { provider: String },
	/// `<login_path>/<provider>` without callback parameters.
	OAuthStart { provider: String },
	Logout,
	/// `POST <login_path>`.
	Credentials,
	/// `GET`/`HEAD <login_path>`, passed on to the login page.
	LoginPage,
	/// Not ours.
	Other,
}

/// Classify a request.
///
/// `is_provider` answers whether a path segment names a configured OAuth
/// provider. Logout wins over every other kind on the login path.
pub fn classify(
	method: &Method,
	path: &str,
	query: Option<&str>,
	login_path: &str,
	callback: &CallbackRequest,
	is_provider: impl Fn(&str) -> bool,
) -> RequestKind {
	let Some(rest) = path.strip_prefix(login_path) else {
		return RequestKind::Other;
	};

	if rest.is_empty() {
		if *method == Method::DELETE || has_logout_param(query) {
			return RequestKind::Logout;
		}
		return match *method {
			Method::POST => RequestKind::Credentials,
			Method::GET | Method::HEAD => RequestKind::LoginPage,
			_ => RequestKind::Other,
		};
	}

	let Some(segment) = rest.strip_prefix('/') else {
		// `/loginfoo` is a different path.
		return RequestKind::Other;
	};
	if segment == "logout" {
		return RequestKind::Logout;
	}
	if segment.is_empty() || segment.contains('/') || !is_provider(segment) {
		return RequestKind::Other;
	}

	let provider = segment.to_string();
	if callback.is_callback() {
		RequestKind::OAuthCallback { provider }
	} else {
		RequestKind::OAuthStart { provider }
	}
}

fn has_logout_param(query: Option<&str>) -> bool {
	let Some(query) = query else {
		return false;
	};
	url::form_urlencoded::parse(query.as_bytes()).any(|(key, value)| key == "logout" && value == "true")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kind(method: Method, path: &str, query: Option<&str>) -> RequestKind {
		let callback = CallbackRequest::from_parts(query, &http::HeaderMap::new());
		classify(&method, path, query, "/login", &callback, |p| p == "github")
	}

	#[test]
	fn login_path_by_method() {
		assert_eq!(kind(Method::POST, "/login", None), RequestKind::Credentials);
		assert_eq!(kind(Method::GET, "/login", None), RequestKind::LoginPage);
		assert_eq!(kind(Method::HEAD, "/login", None), RequestKind::LoginPage);
		assert_eq!(kind(Method::PUT, "/login", None), RequestKind::Other);
	}

	#[test]
	fn logout_variants() {
		assert_eq!(kind(Method::GET, "/login/logout", None), RequestKind::Logout);
		assert_eq!(kind(Method::POST, "/login/logout", None), RequestKind::Logout);
		assert_eq!(kind(Method::DELETE, "/login", None), RequestKind::Logout);
		assert_eq!(kind(Method::GET, "/login", Some("logout=true")), RequestKind::Logout);
		assert_eq!(kind(Method::POST, "/login", Some("logout=true")), RequestKind::Logout);
		assert_eq!(kind(Method::GET, "/login", Some("logout=false")), RequestKind::LoginPage);
	}

	#[test]
	fn oauth_start_and_callback() {
		let github = || "github".to_string();
		assert_eq!(
			kind(Method::GET, "/login/github", None),
			RequestKind::OAuthStart { provider: github() }
		);
		assert_eq!(
			kind(Method::GET, "/login/github", Some("code=abc&state=xyz")),
			RequestKind::OAuthCallback { provider: github() }
		);
		assert_eq!(
			kind(Method::GET, "/login/github", Some("error=access_denied")),
			RequestKind::OAuthCallback { provider: github() }
		);
		assert_eq!(
			kind(Method::GET, "/login/github", Some("state=xyz")),
			RequestKind::OAuthStart { provider: github() }
		);
	}

	#[test]
	fn unrelated_paths_pass_through() {
		assert_eq!(kind(Method::GET, "/", None), RequestKind::Other);
		assert_eq!(kind(Method::POST, "/loginx", None), RequestKind::Other);
		assert_eq!(kind(Method::GET, "/login/", None), RequestKind::Other);
		assert_eq!(kind(Method::GET, "/login/gitlab", None), RequestKind::Other);
		assert_eq!(kind(Method::GET, "/login/github/extra", None), RequestKind::Other);
		assert_eq!(kind(Method::GET, "/other/login", None), RequestKind::Other);
	}
}
