// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Custom claims from a TOML file of user entries.
//!
//! ```toml
//! [[users]]
//! sub = "bob"
//! origin = "htpasswd"
//!
//! [users.claims]
//! role = "admin"
//!
//! [[users]]
//! domain = "example.com"
//! groups = ["staff"]
//!
//! [users.claims]
//! role = "employee"
//! ```
//!
//! Every filter that is present must match; groups match when the identity
//! shares at least one. The first matching entry wins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use logsrv_common_core::Identity;
use serde::Deserialize;
use tracing::{debug, info};

use super::{ClaimsError, ClaimsSource, CustomClaims};

#[derive(Debug, Clone, Default, Deserialize)]
struct UserEntry {
	sub: Option<String>,
	origin: Option<String>,
	domain: Option<String>,
	#[serde(default)]
	groups: Vec<String>,
	#[serde(default)]
	claims: CustomClaims,
}

impl UserEntry {
	fn matches(&self, identity: &Identity) -> bool {
		if self.sub.as_deref().is_some_and(|sub| sub != identity.sub) {
			return false;
		}
		if self.origin.as_deref().is_some_and(|origin| origin != identity.origin) {
			return false;
		}
		if let Some(domain) = &self.domain {
			if identity.domain.as_deref() != Some(domain.as_str()) {
				return false;
			}
		}
		if !self.groups.is_empty() && !self.groups.iter().any(|g| identity.groups.contains(g)) {
			return false;
		}
		true
	}
}

#[derive(Debug, Default, Deserialize)]
struct UserFile {
	#[serde(default)]
	users: Vec<UserEntry>,
}

/// Claims source backed by a user file, read once at construction.
#[derive(Debug)]
pub struct FileClaimsSource {
	path: PathBuf,
	users: Vec<UserEntry>,
}

impl FileClaimsSource {
	pub fn load(path: &Path) -> Result<Self, ClaimsError> {
		let content = std::fs::read_to_string(path).map_err(|source| ClaimsError::FileRead {
			path: path.to_path_buf(),
			source,
		})?;
		let file = Self::parse(path, &content)?;
		info!(path = %path.display(), entries = file.users.len(), "loaded user claims file");
		Ok(file)
	}

	fn parse(path: &Path, content: &str) -> Result<Self, ClaimsError> {
		let file: UserFile = toml::from_str(content).map_err(|source| ClaimsError::FileParse {
			path: path.to_path_buf(),
			source,
		})?;
		Ok(Self {
			path: path.to_path_buf(),
			users: file.users,
		})
	}
}

#[async_trait]
impl ClaimsSource for FileClaimsSource {
	async fn claims_for(&self, identity: &Identity) -> Result<Option<CustomClaims>, ClaimsError> {
		let entry = self.users.iter().find(|entry| entry.matches(identity));
		debug!(
			path = %self.path.display(),
			sub = %identity.sub,
			matched = entry.is_some(),
			"looked up user claims"
		);
		Ok(entry.map(|entry| entry.claims.clone()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::io::Write;

	const USERS: &str = r#"
[[users]]
sub = "bob"
origin = "htpasswd"

[users.claims]
role = "admin"
projects = ["a", "b"]

[[users]]
domain = "example.com"
groups = ["staff", "contractors"]

[users.claims]
role = "employee"

[[users]]
sub = "bob"

[users.claims]
role = "fallback"
"#;

	fn source() -> FileClaimsSource {
		FileClaimsSource::parse(Path::new("users.toml"), USERS).unwrap()
	}

	#[tokio::test]
	async fn first_matching_entry_wins() {
		let claims = source()
			.claims_for(&Identity::new("bob", "htpasswd"))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(claims.get("role"), Some(&json!("admin")));
		assert_eq!(claims.get("projects"), Some(&json!(["a", "b"])));

		let claims = source()
			.claims_for(&Identity::new("bob", "simple"))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(claims.get("role"), Some(&json!("fallback")));
	}

	#[tokio::test]
	async fn domain_and_any_group_must_match() {
		let staff = Identity::new("carol@example.com", "google")
			.with_domain("example.com")
			.with_groups(["contractors"]);
		let claims = source().claims_for(&staff).await.unwrap().unwrap();
		assert_eq!(claims.get("role"), Some(&json!("employee")));

		let no_group = Identity::new("dave@example.com", "google").with_domain("example.com");
		assert!(source().claims_for(&no_group).await.unwrap().is_none());

		let other_domain = Identity::new("eve@other.org", "google")
			.with_domain("other.org")
			.with_groups(["staff"]);
		assert!(source().claims_for(&other_domain).await.unwrap().is_none());
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(USERS.as_bytes()).unwrap();
		let source = FileClaimsSource::load(file.path()).unwrap();
		assert_eq!(source.users.len(), 3);
	}

	#[test]
	fn missing_file_fails() {
		let err = FileClaimsSource::load(Path::new("/nonexistent/users.toml")).unwrap_err();
		assert!(matches!(err, ClaimsError::FileRead { .. }));
	}

	#[test]
	fn invalid_toml_fails() {
		let err = FileClaimsSource::parse(Path::new("x.toml"), "[[users]\nsub=").unwrap_err();
		assert!(matches!(err, ClaimsError::FileParse { .. }));
	}
}
