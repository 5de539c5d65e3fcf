// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Response builders for the login middleware.

use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use http::{HeaderValue, StatusCode};
use logsrv_common_http::cookie::{self, Cookie};
use tracing::warn;

/// Content type of a bare token body.
pub const JWT_CONTENT_TYPE: &str = "application/jwt";

/// A redirect to `location`, or to `fallback` when `location` is not a
/// valid header value.
pub fn redirect(status: StatusCode, location: &str, fallback: &str) -> Response {
	let location = HeaderValue::from_str(location)
		.or_else(|_| {
			warn!(location = %location, "invalid redirect location, using fallback");
			HeaderValue::from_str(fallback)
		})
		.unwrap_or_else(|_| HeaderValue::from_static("/"));

	let mut response = status.into_response();
	response.headers_mut().insert(LOCATION, location);
	response
}

/// Generic authentication failure. Details stay in the logs.
pub fn forbidden() -> Response {
	(StatusCode::FORBIDDEN, "Authentication failed").into_response()
}

pub fn backend_unavailable() -> Response {
	(
		StatusCode::SERVICE_UNAVAILABLE,
		"Authentication backend unavailable",
	)
		.into_response()
}

pub fn bad_request(message: &'static str) -> Response {
	(StatusCode::BAD_REQUEST, message).into_response()
}

pub fn internal_error() -> Response {
	(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// The token itself as the response body.
pub fn jwt_body(token: String) -> Response {
	(
		StatusCode::OK,
		[(CONTENT_TYPE, HeaderValue::from_static(JWT_CONTENT_TYPE))],
		token,
	)
		.into_response()
}

/// Append a `Set-Cookie` header. Cookies that are not valid header values
/// are dropped with a warning.
pub fn append_cookie(response: &mut Response, set_cookie: &Cookie<'_>) {
	match cookie::to_header_value(set_cookie) {
		Ok(value) => {
			response.headers_mut().append(SET_COOKIE, value);
		}
		Err(e) => warn!(cookie = %set_cookie.name(), error = %e, "dropping invalid cookie"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn redirect_sets_location() {
		let response = redirect(StatusCode::FOUND, "/admin", "/");
		assert_eq!(response.status(), StatusCode::FOUND);
		assert_eq!(response.headers()[LOCATION], "/admin");
	}

	#[test]
	fn invalid_location_uses_fallback() {
		let response = redirect(StatusCode::FOUND, "/bad\nlocation", "/home");
		assert_eq!(response.headers()[LOCATION], "/home");

		let response = redirect(StatusCode::FOUND, "/bad\n", "/also\nbad");
		assert_eq!(response.headers()[LOCATION], "/");
	}

	#[test]
	fn cookies_accumulate() {
		let mut response = forbidden();
		append_cookie(&mut response, &cookie::build("a", "1").build());
		append_cookie(&mut response, &cookie::removal("b"));
		append_cookie(&mut response, &cookie::build("c", "bad\nvalue").build());

		let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
		assert_eq!(cookies.len(), 2);
	}

	#[test]
	fn jwt_body_content_type() {
		let response = jwt_body("a.b.c".to_string());
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(response.headers()[CONTENT_TYPE], JWT_CONTENT_TYPE);
	}
}
