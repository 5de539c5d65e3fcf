// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login backend over one or more htpasswd files.
//!
//! Options: `file=/etc/logsrv/users;/etc/logsrv/more-users`.
//!
//! Each line is `user:hash`. Hashes are checked with [`pwhash::unix::verify`],
//! which understands bcrypt (`$2y$`, `$2b$`), MD5-crypt (`$1$`) and
//! SHA-crypt (`$5$`, `$6$`). Apache's `$apr1$` and `{SHA}` variants are not
//! supported; users stored with them are rejected with a warning.
//!
//! Files must exist when the backend is built and are re-read on every
//! attempt, so edits take effect without a restart. The first file that
//! lists a user decides for that user.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use logsrv_common_core::{Identity, ProviderDescription};
use logsrv_config::ProviderOptions;
use logsrv_login::{Backend, BackendError, BackendRegistry};
use tracing::{debug, instrument, warn};

pub const PROVIDER_NAME: &str = "htpasswd";

const FILE_OPTION: &str = "file";

/// `$<id>$` prefixes understood by [`pwhash::unix::verify`].
const SUPPORTED_SCHEMES: &[&str] = &["1", "2a", "2b", "2y", "5", "6", "sha1"];

pub fn description() -> ProviderDescription {
	ProviderDescription::new(
		PROVIDER_NAME,
		"Login against htpasswd file opts: file=/path/to/pwdfile[;/path/to/other]",
	)
}

pub fn register(registry: &mut BackendRegistry) {
	registry.register(description(), |options| {
		Ok(Box::new(HtpasswdBackend::from_options(options)?) as Box<dyn Backend>)
	});
}

#[derive(Debug, Clone)]
pub struct HtpasswdBackend {
	files: Vec<PathBuf>,
}

impl HtpasswdBackend {
	pub fn from_options(options: &ProviderOptions) -> Result<Self, BackendError> {
		let Some(files) = options.get(FILE_OPTION) else {
			return Err(BackendError::Config(format!(
				"missing parameter '{FILE_OPTION}' for htpasswd backend"
			)));
		};

		let files: Vec<PathBuf> = files
			.split(';')
			.map(str::trim)
			.filter(|f| !f.is_empty())
			.map(PathBuf::from)
			.collect();
		if files.is_empty() {
			return Err(BackendError::Config(
				"htpasswd backend needs at least one file".to_string(),
			));
		}

		for file in &files {
			std::fs::read_to_string(file).map_err(|e| {
				BackendError::Config(format!("cannot read htpasswd file {}: {e}", file.display()))
			})?;
		}
		Ok(Self { files })
	}

	async fn lookup_hash(&self, username: &str) -> Result<Option<String>, BackendError> {
		for file in &self.files {
			if let Some(hash) = read_hash(file, username).await? {
				return Ok(Some(hash));
			}
		}
		Ok(None)
	}
}

async fn read_hash(file: &Path, username: &str) -> Result<Option<String>, BackendError> {
	let content = tokio::fs::read_to_string(file).await.map_err(|e| {
		BackendError::Unavailable(format!("cannot read htpasswd file {}: {e}", file.display()))
	})?;
	Ok(content
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.filter_map(|line| line.split_once(':'))
		.find(|(user, _)| *user == username)
		.map(|(_, hash)| hash.to_string()))
}

/// The scheme tag of a hash that cannot be verified, e.g. `$apr1$` or `{SHA}`.
fn unsupported_scheme(hash: &str) -> Option<&str> {
	if hash.starts_with('{') {
		return hash.find('}').map(|end| &hash[..=end]);
	}
	let id = hash.strip_prefix('$')?.split('$').next()?;
	if SUPPORTED_SCHEMES.contains(&id) {
		return None;
	}
	Some(hash.get(..id.len() + 2).unwrap_or(hash))
}

#[async_trait]
impl Backend for HtpasswdBackend {
	#[instrument(skip(self, password), fields(files = self.files.len()))]
	async fn authenticate(
		&self,
		username: &str,
		password: &str,
	) -> Result<Option<Identity>, BackendError> {
		let Some(hash) = self.lookup_hash(username).await? else {
			debug!("user not in any htpasswd file");
			return Ok(None);
		};

		if let Some(scheme) = unsupported_scheme(&hash) {
			warn!(
				user = %username,
				scheme = %scheme,
				"htpasswd hash scheme not supported, rejecting login"
			);
			return Ok(None);
		}

		let password = password.to_string();
		let matched = tokio::task::spawn_blocking(move || pwhash::unix::verify(password, &hash))
			.await
			.map_err(|e| BackendError::Unavailable(format!("password verification failed: {e}")))?;

		Ok(matched.then(|| Identity::new(username, PROVIDER_NAME)))
	}
}
