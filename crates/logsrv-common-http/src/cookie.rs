// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cookie helpers for reading request cookies and building `Set-Cookie` values.
//!
//! logsrv emits three cookies: the identity token cookie, the OAuth state
//! cookie and the redirect-target cookie. All of them are built with
//! [`build`] so they share `Path=/`, and cleared with [`removal`].

use std::time::Duration;

use ::cookie::time;
pub use ::cookie::{Cookie, CookieBuilder, SameSite};
use http::header::{InvalidHeaderValue, COOKIE};
use http::{HeaderMap, HeaderValue};

/// Extract a cookie value by name from the request's `Cookie` header(s).
///
/// Returns the first value found. The value is returned as sent; use
/// [`decode_value`] for cookies written with [`encode_value`].
pub fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			(name == cookie_name).then(|| value.to_string())
		})
}

/// Percent-encode an arbitrary string so it is safe as a cookie value.
pub fn encode_value(raw: &str) -> String {
	urlencoding::encode(raw).into_owned()
}

/// Reverse [`encode_value`]. Returns `None` for invalid UTF-8 escapes.
pub fn decode_value(encoded: &str) -> Option<String> {
	urlencoding::decode(encoded).ok().map(|v| v.into_owned())
}

/// Start a cookie scoped to `/`.
pub fn build(name: impl Into<String>, value: impl Into<String>) -> CookieBuilder<'static> {
	Cookie::build((name.into(), value.into())).path("/")
}

/// A cookie that instructs the browser to delete `name` immediately.
pub fn removal(name: impl Into<String>) -> Cookie<'static> {
	let mut cookie = build(name, "").build();
	cookie.make_removal();
	cookie
}

/// `Max-Age` from a std duration, saturating at `i64::MAX` seconds.
pub fn max_age(duration: Duration) -> time::Duration {
	time::Duration::seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
}

/// Render as a header value, failing on control characters in name or value.
pub fn to_header_value(cookie: &Cookie<'_>) -> Result<HeaderValue, InvalidHeaderValue> {
	HeaderValue::from_str(&cookie.to_string())
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// Whatever is written through `encode_value` can be read back by name.
		#[test]
		fn encoded_values_survive_extraction(raw in "[ -~]{0,64}") {
			let encoded = encode_value(&raw);
			let header = format!("backTo={encoded}; jwt_token=x");
			let mut headers = HeaderMap::new();
			headers.insert(COOKIE, HeaderValue::from_str(&header).unwrap());

			let extracted = extract_cookie(&headers, "backTo").unwrap();
			prop_assert_eq!(decode_value(&extracted), Some(raw));
		}
	}
}
