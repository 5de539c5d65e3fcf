// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed environment variable access with an injectable lookup.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use logsrv_common_secret::SecretString;

use crate::error::ConfigError;

type LookupFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Reads environment variables through a lookup function.
///
/// [`EnvLookup::process`] reads the real process environment; tests build one
/// from a fixed map with [`EnvLookup::from_fn`]. Empty values count as unset.
#[derive(Clone)]
pub struct EnvLookup {
	lookup: Arc<LookupFn>,
}

impl EnvLookup {
	pub fn process() -> Self {
		Self::from_fn(|name| std::env::var(name).ok())
	}

	pub fn from_fn<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		Self {
			lookup: Arc::new(lookup),
		}
	}

	pub fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	pub fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	pub fn parse<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
	where
		T: FromStr,
		T::Err: fmt::Display,
	{
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|e| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid value '{v}': {e}"),
			}),
			None => Ok(None),
		}
	}

	pub fn duration(&self, name: &str) -> Result<Option<Duration>, ConfigError> {
		match self.var(name) {
			Some(v) => humantime::parse_duration(&v)
				.map(Some)
				.map_err(|e| ConfigError::InvalidValue {
					key: name.to_string(),
					message: format!("invalid duration '{v}': {e}"),
				}),
			None => Ok(None),
		}
	}

	/// Load a secret from `name`, or from the file named by `{name}_FILE`.
	///
	/// The direct variable wins when both are set. Trailing newlines in the
	/// file are stripped.
	pub fn secret(&self, name: &str) -> Result<Option<SecretString>, ConfigError> {
		if let Some(value) = self.var(name) {
			return Ok(Some(SecretString::new(value)));
		}

		let file_var = format!("{name}_FILE");
		let Some(path) = self.var(&file_var) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&path)
			.map_err(|e| ConfigError::Secret(format!("{file_var}: failed to read {path}: {e}")))?;
		let trimmed = content.trim_end_matches(['\r', '\n']);
		Ok(Some(SecretString::new(trimmed.to_string())))
	}
}

impl fmt::Debug for EnvLookup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EnvLookup").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	fn lookup(pairs: &[(&str, &str)]) -> EnvLookup {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		EnvLookup::from_fn(move |name| map.get(name).cloned())
	}

	#[test]
	fn empty_values_are_unset() {
		let env = lookup(&[("A", "")]);
		assert_eq!(env.var("A"), None);
	}

	#[test]
	fn bool_accepts_true_and_one() {
		let env = lookup(&[("A", "TRUE"), ("B", "1"), ("C", "no")]);
		assert_eq!(env.bool("A"), Some(true));
		assert_eq!(env.bool("B"), Some(true));
		assert_eq!(env.bool("C"), Some(false));
		assert_eq!(env.bool("D"), None);
	}

	#[test]
	fn parse_reports_key_on_error() {
		let env = lookup(&[("PORT", "not-a-port")]);
		let err = env.parse::<u16>("PORT").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
	}

	#[test]
	fn duration_uses_humantime() {
		let env = lookup(&[("EXPIRY", "1h 30m"), ("BAD", "soon")]);
		assert_eq!(
			env.duration("EXPIRY").unwrap(),
			Some(Duration::from_secs(5400))
		);
		assert!(env.duration("BAD").is_err());
	}

	#[test]
	fn secret_prefers_direct_value() {
		let env = lookup(&[("TOKEN", "direct"), ("TOKEN_FILE", "/nonexistent")]);
		let secret = env.secret("TOKEN").unwrap().unwrap();
		assert_eq!(secret.expose(), "direct");
	}

	#[test]
	fn secret_reads_file_and_strips_newline() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();
		let path = file.path().to_string_lossy().to_string();

		let env = lookup(&[("TOKEN_FILE", path.as_str())]);
		let secret = env.secret("TOKEN").unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");
	}

	#[test]
	fn secret_file_missing_is_error() {
		let env = lookup(&[("TOKEN_FILE", "/nonexistent/logsrv/token")]);
		assert!(matches!(env.secret("TOKEN"), Err(ConfigError::Secret(_))));
	}
}
