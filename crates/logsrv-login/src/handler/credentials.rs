// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Username/password submissions as form or JSON bodies.

use serde::Deserialize;

/// A parsed credential submission.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Credentials {
	pub username: String,
	pub password: String,
	pub logout: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CredentialsError {
	UnsupportedContentType(String),
	InvalidJson(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFlag {
	Bool(bool),
	Text(String),
}

#[derive(Deserialize)]
struct JsonCredentials {
	#[serde(default)]
	username: String,
	#[serde(default)]
	password: String,
	#[serde(default)]
	logout: Option<JsonFlag>,
}

impl Credentials {
	/// Parse a body by its `Content-Type`. A missing content type is an
	/// empty submission.
	pub fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Self, CredentialsError> {
		let mime = content_type
			.map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
			.unwrap_or_default();

		match mime.as_str() {
			"" => Ok(Self::default()),
			"application/x-www-form-urlencoded" => Ok(Self::from_form(body)),
			"application/json" => Self::from_json(body),
			other => Err(CredentialsError::UnsupportedContentType(other.to_string())),
		}
	}

	fn from_form(body: &[u8]) -> Self {
		let mut credentials = Self::default();
		for (key, value) in url::form_urlencoded::parse(body) {
			match key.as_ref() {
				"username" => credentials.username = value.into_owned(),
				"password" => credentials.password = value.into_owned(),
				"logout" => credentials.logout = value == "true",
				_ => {}
			}
		}
		credentials
	}

	fn from_json(body: &[u8]) -> Result<Self, CredentialsError> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self::default());
		}
		let parsed: JsonCredentials =
			serde_json::from_slice(body).map_err(|e| CredentialsError::InvalidJson(e.to_string()))?;
		let logout = match parsed.logout {
			Some(JsonFlag::Bool(flag)) => flag,
			Some(JsonFlag::Text(text)) => text == "true",
			None => false,
		};
		Ok(Self {
			username: parsed.username,
			password: parsed.password,
			logout,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn form_body() {
		let creds = Credentials::parse(
			Some("application/x-www-form-urlencoded"),
			b"username=bob&password=s%26cret",
		)
		.unwrap();
		assert_eq!(creds.username, "bob");
		assert_eq!(creds.password, "s&cret");
		assert!(!creds.logout);
	}

	#[test]
	fn json_body_with_charset() {
		let creds = Credentials::parse(
			Some("application/json; charset=utf-8"),
			br#"{"username":"bob","password":"secret"}"#,
		)
		.unwrap();
		assert_eq!(creds.username, "bob");
		assert_eq!(creds.password, "secret");
	}

	#[test]
	fn logout_flags() {
		assert!(Credentials::parse(Some("application/x-www-form-urlencoded"), b"logout=true").unwrap().logout);
		assert!(Credentials::parse(Some("application/json"), br#"{"logout":true}"#).unwrap().logout);
		assert!(Credentials::parse(Some("application/json"), br#"{"logout":"true"}"#).unwrap().logout);
		assert!(!Credentials::parse(Some("application/json"), br#"{"logout":"no"}"#).unwrap().logout);
	}

	#[test]
	fn empty_content_type_is_empty_submission() {
		assert_eq!(Credentials::parse(None, b"ignored").unwrap(), Credentials::default());
		assert_eq!(Credentials::parse(Some("application/json"), b"").unwrap(), Credentials::default());
	}

	#[test]
	fn unsupported_content_type() {
		assert_eq!(
			Credentials::parse(Some("text/plain"), b"bob:secret"),
			Err(CredentialsError::UnsupportedContentType("text/plain".to_string()))
		);
	}

	#[test]
	fn invalid_json() {
		assert!(matches!(
			Credentials::parse(Some("application/json"), b"{not json"),
			Err(CredentialsError::InvalidJson(_))
		));
	}
}
