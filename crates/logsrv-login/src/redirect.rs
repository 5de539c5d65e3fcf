// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post-login redirect targets.
//!
//! A `GET /login?backTo=<url>` stores `<url>` in a cookie named after the
//! query parameter. After a successful login the cookie is honored only when
//! redirects are enabled, the `Referer` host matches the request host (if
//! referer checking is on), and the target resolves, relative to the request
//! host, to an http(s) URL on the request host or on a host listed in the
//! redirect host file. Anything else falls back to the success URL.

use std::collections::HashSet;
use std::path::Path;

use http::header::REFERER;
use http::{HeaderMap, Method};
use logsrv_common_http::cookie::{self, decode_value, encode_value, extract_cookie, Cookie};
use logsrv_config::RedirectConfig;
use tracing::{info, warn};
use url::{Position, Url};

use crate::error::LoginError;

/// Base host used to resolve targets when the request has no `Host`.
const UNKNOWN_HOST: &str = "request.invalid";

#[derive(Debug, Clone)]
pub struct RedirectPolicy {
	enabled: bool,
	query_parameter: String,
	check_referer: bool,
	allowed_hosts: HashSet<String>,
	success_url: String,
}

impl RedirectPolicy {
	pub fn new(config: &RedirectConfig, success_url: impl Into<String>) -> Result<Self, LoginError> {
		let allowed_hosts = match &config.host_file {
			Some(path) => read_host_file(path)?,
			None => HashSet::new(),
		};
		Ok(Self {
			enabled: config.enabled,
			query_parameter: config.query_parameter.clone(),
			check_referer: config.check_referer,
			allowed_hosts,
			success_url: success_url.into(),
		})
	}

	pub fn success_url(&self) -> &str {
		&self.success_url
	}

	/// Name of both the query parameter and the cookie.
	pub fn cookie_name(&self) -> &str {
		&self.query_parameter
	}

	/// Whether this request may influence the redirect target at all.
	pub fn allow_redirect(&self, headers: &HeaderMap, request_host: &str) -> bool {
		if !self.enabled {
			return false;
		}
		if !self.check_referer {
			return true;
		}

		let Some(referer) = headers.get(REFERER).and_then(|v| v.to_str().ok()) else {
			warn!("redirect rejected, request has no referer");
			return false;
		};
		let referer_host = match Url::parse(referer) {
			Ok(url) => host_with_port(&url),
			Err(e) => {
				warn!(error = %e, "couldn't parse referer url");
				return false;
			}
		};
		if !referer_host.eq_ignore_ascii_case(request_host) {
			warn!(
				referer_host = %referer_host,
				request_host = %request_host,
				"redirect from referer domain not matching current domain"
			);
			return false;
		}
		true
	}

	/// The redirect cookie for a `?<query_parameter>=<url>` request, if the
	/// request qualifies. `POST` requests never set it.
	pub fn capture(
		&self,
		method: &Method,
		query: Option<&str>,
		headers: &HeaderMap,
		request_host: &str,
	) -> Option<Cookie<'static>> {
		if *method == Method::POST {
			return None;
		}
		let target = url::form_urlencoded::parse(query?.as_bytes())
			.find(|(key, _)| key == self.query_parameter.as_str())
			.map(|(_, value)| value.into_owned())
			.filter(|value| !value.is_empty())?;
		if !self.allow_redirect(headers, request_host) {
			return None;
		}
		Some(
			cookie::build(self.query_parameter.clone(), encode_value(&target))
				.http_only(true)
				.build(),
		)
	}

	/// Whether the request carries a redirect cookie.
	pub fn has_cookie(&self, headers: &HeaderMap) -> bool {
		extract_cookie(headers, &self.query_parameter).is_some()
	}

	/// Where to send the browser after a successful login.
	pub fn target(&self, headers: &HeaderMap, request_host: &str) -> String {
		let Some(target) = extract_cookie(headers, &self.query_parameter)
			.and_then(|raw| decode_value(&raw))
			.filter(|t| !t.is_empty())
		else {
			return self.success_url.clone();
		};
		if !self.allow_redirect(headers, request_host) {
			return self.success_url.clone();
		}
		match self.resolve_target(&target, request_host) {
			Some(resolved) => resolved,
			None => {
				warn!(target = %target, "redirect target host not allowed");
				self.success_url.clone()
			}
		}
	}

	pub fn clear_cookie(&self) -> Cookie<'static> {
		cookie::removal(self.query_parameter.clone())
	}

	/// Resolve `target` the way a browser would against the request host.
	///
	/// Returns the normalized location when the resolved URL is http(s) and
	/// on the request host or an allowed host. Same-host targets that were
	/// relative stay relative.
	fn resolve_target(&self, target: &str, request_host: &str) -> Option<String> {
		let base_host = if request_host.is_empty() {
			UNKNOWN_HOST
		} else {
			request_host
		};
		let base = Url::parse(&format!("http://{base_host}/")).ok()?;
		let url = base.join(target).ok()?;
		if !matches!(url.scheme(), "http" | "https") {
			return None;
		}

		let host = host_with_port(&url);
		if host.is_empty() {
			return None;
		}
		let same_host = host.eq_ignore_ascii_case(&host_with_port(&base));
		let listed = self.allowed_hosts.contains(&host.to_ascii_lowercase())
			|| url
				.host_str()
				.is_some_and(|h| self.allowed_hosts.contains(&h.to_ascii_lowercase()));
		if !same_host && !listed {
			return None;
		}

		if same_host && Url::parse(target).is_err() {
			Some(url[Position::BeforePath..].to_string())
		} else {
			Some(url.to_string())
		}
	}
}

fn host_with_port(url: &Url) -> String {
	match (url.host_str(), url.port()) {
		(Some(host), Some(port)) => format!("{host}:{port}"),
		(Some(host), None) => host.to_string(),
		_ => String::new(),
	}
}

/// One host per line; blank lines and `#` comments are ignored.
fn read_host_file(path: &Path) -> Result<HashSet<String>, LoginError> {
	let content = std::fs::read_to_string(path).map_err(|source| LoginError::RedirectHostFile {
		path: path.to_path_buf(),
		source,
	})?;
	let hosts: HashSet<String> = content
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.map(str::to_ascii_lowercase)
		.collect();
	info!(path = %path.display(), hosts = hosts.len(), "loaded redirect host file");
	Ok(hosts)
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::COOKIE;
	use http::HeaderValue;
	use std::io::Write;

	const HOST: &str = "app.example.com";

	fn policy() -> RedirectPolicy {
		RedirectPolicy::new(&RedirectConfig::default(), "/welcome").unwrap()
	}

	fn headers(referer: Option<&str>, cookie: Option<&str>) -> HeaderMap {
		let mut headers = HeaderMap::new();
		if let Some(referer) = referer {
			headers.insert(REFERER, HeaderValue::from_str(referer).unwrap());
		}
		if let Some(cookie) = cookie {
			headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
		}
		headers
	}

	#[test]
	fn referer_must_match_host() {
		let policy = policy();
		assert!(policy.allow_redirect(&headers(Some("https://app.example.com/login"), None), HOST));
		assert!(policy.allow_redirect(&headers(Some("https://APP.example.com/"), None), HOST));
		assert!(!policy.allow_redirect(&headers(Some("https://evil.example.org/"), None), HOST));
		assert!(!policy.allow_redirect(&headers(Some("::not a url"), None), HOST));
		assert!(!policy.allow_redirect(&headers(None, None), HOST));
	}

	#[test]
	fn referer_port_is_part_of_host() {
		let policy = policy();
		let h = headers(Some("http://localhost:6789/login"), None);
		assert!(policy.allow_redirect(&h, "localhost:6789"));
		assert!(!policy.allow_redirect(&h, "localhost"));
	}

	#[test]
	fn disabled_redirects_never_allowed() {
		let config = RedirectConfig {
			enabled: false,
			..Default::default()
		};
		let policy = RedirectPolicy::new(&config, "/").unwrap();
		let h = headers(Some("https://app.example.com/"), Some("backTo=%2Fadmin"));
		assert!(!policy.allow_redirect(&h, HOST));
		assert_eq!(policy.target(&h, HOST), "/");
	}

	#[test]
	fn referer_check_can_be_disabled() {
		let config = RedirectConfig {
			check_referer: false,
			..Default::default()
		};
		let policy = RedirectPolicy::new(&config, "/").unwrap();
		assert!(policy.allow_redirect(&HeaderMap::new(), HOST));
	}

	#[test]
	fn capture_sets_cookie_on_get_only() {
		let policy = policy();
		let h = headers(Some("https://app.example.com/"), None);

		let cookie = policy
			.capture(&Method::GET, Some("backTo=/admin?x=1"), &h, HOST)
			.unwrap();
		assert_eq!(cookie.name(), "backTo");
		assert_eq!(decode_value(cookie.value()).unwrap(), "/admin?x=1");

		assert!(policy.capture(&Method::POST, Some("backTo=/admin"), &h, HOST).is_none());
		assert!(policy.capture(&Method::GET, Some("other=1"), &h, HOST).is_none());
		assert!(policy.capture(&Method::GET, Some("backTo="), &h, HOST).is_none());
		assert!(policy.capture(&Method::GET, None, &h, HOST).is_none());
	}

	#[test]
	fn capture_requires_matching_referer() {
		let h = headers(Some("https://evil.example.org/"), None);
		assert!(policy().capture(&Method::GET, Some("backTo=/admin"), &h, HOST).is_none());
	}

	#[test]
	fn target_honors_relative_and_same_host() {
		let policy = policy();
		let referer = Some("https://app.example.com/login");

		let h = headers(referer, Some("backTo=%2Fadmin"));
		assert_eq!(policy.target(&h, HOST), "/admin");

		let h = headers(referer, Some("backTo=https%3A%2F%2Fapp.example.com%2Fdash"));
		assert_eq!(policy.target(&h, HOST), "https://app.example.com/dash");
	}

	#[test]
	fn target_rejects_foreign_hosts() {
		let policy = policy();
		let referer = Some("https://app.example.com/login");

		for cookie in [
			"backTo=https%3A%2F%2Fevil.example.org%2F",
			"backTo=%2F%2Fevil.example.org%2F",
			"backTo=%2F%5Cevil.example.org",
			"backTo=%2F%09%2Fevil.example.org%2F",
			"backTo=%2F%0A%2Fevil.example.org%2F",
			"backTo=%2F%0D%2Fevil.example.org",
			"backTo=%09%2F%2Fevil.example.org",
			"backTo=%5C%5Cevil.example.org",
			"backTo=https%3A%2F%2Fapp.example.com%40evil.example.org%2F",
			"backTo=javascript%3Aalert(1)",
			"backTo=data%3Atext%2Fhtml%2C%3Cscript%3E",
		] {
			assert_eq!(policy.target(&headers(referer, Some(cookie)), HOST), "/welcome", "{cookie}");
		}
	}

	#[test]
	fn relative_targets_are_normalized() {
		let policy = policy();
		let referer = Some("https://app.example.com/login");

		let h = headers(referer, Some("backTo=%2Fad%09min%3Fx%3D1"));
		assert_eq!(policy.target(&h, HOST), "/admin?x=1");

		let h = headers(referer, Some("backTo=dashboard"));
		assert_eq!(policy.target(&h, HOST), "/dashboard");
	}

	#[test]
	fn relative_target_without_host_header() {
		let config = RedirectConfig {
			check_referer: false,
			..Default::default()
		};
		let policy = RedirectPolicy::new(&config, "/").unwrap();

		let h = headers(None, Some("backTo=%2Fadmin"));
		assert_eq!(policy.target(&h, ""), "/admin");

		let h = headers(None, Some("backTo=%2F%09%2Fevil.example.org%2F"));
		assert_eq!(policy.target(&h, ""), "/");
	}

	#[test]
	fn target_without_cookie_or_referer_is_success_url() {
		let policy = policy();
		assert_eq!(policy.target(&HeaderMap::new(), HOST), "/welcome");
		assert_eq!(policy.target(&headers(None, Some("backTo=%2Fadmin")), HOST), "/welcome");
	}

	#[test]
	fn host_file_extends_allowed_hosts() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "# trusted\ndocs.example.com\n\nWIKI.example.com").unwrap();
		let config = RedirectConfig {
			host_file: Some(file.path().to_path_buf()),
			..Default::default()
		};
		let policy = RedirectPolicy::new(&config, "/").unwrap();
		let referer = Some("https://app.example.com/login");

		let h = headers(referer, Some("backTo=https%3A%2F%2Fwiki.example.com%2Fpage"));
		assert_eq!(policy.target(&h, HOST), "https://wiki.example.com/page");

		let h = headers(referer, Some("backTo=https%3A%2F%2Fother.example.com%2F"));
		assert_eq!(policy.target(&h, HOST), "/");
	}

	#[test]
	fn missing_host_file_fails() {
		let config = RedirectConfig {
			host_file: Some("/nonexistent/hosts".into()),
			..Default::default()
		};
		assert!(matches!(
			RedirectPolicy::new(&config, "/"),
			Err(LoginError::RedirectHostFile { .. })
		));
	}
}
