// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The signed claim set and the sources of custom claims.
//!
//! [`Claims`] has a fixed set of reserved keys plus an `extra` map. Custom
//! claims from a [`ClaimsSource`] are merged with [`Claims::merge_custom`]:
//! they override every key except `exp`.

mod endpoint;
mod file;

pub use endpoint::EndpointClaimsSource;
pub use file::FileClaimsSource;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logsrv_common_core::Identity;
use logsrv_config::ClaimsConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Custom claims returned by a source.
pub type CustomClaims = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ClaimsError {
	#[error("failed to read claims file {path}: {source}")]
	FileRead {
		path: std::path::PathBuf,
		source: std::io::Error,
	},

	#[error("failed to parse claims file {path}: {source}")]
	FileParse {
		path: std::path::PathBuf,
		source: toml::de::Error,
	},

	#[error("invalid claims endpoint: {0}")]
	InvalidEndpoint(String),

	#[error("claims endpoint request failed: {0}")]
	Endpoint(String),

	#[error("malformed custom claims: {0}")]
	Malformed(String),
}

/// Supplies extra claims for an authenticated identity.
#[async_trait]
pub trait ClaimsSource: Send + Sync {
	/// `Ok(None)` when the source has nothing for this identity.
	async fn claims_for(&self, identity: &Identity) -> Result<Option<CustomClaims>, ClaimsError>;
}

/// Build the configured claims source. The endpoint wins over the file.
pub fn source_from_config(
	config: &ClaimsConfig,
) -> Result<Option<Arc<dyn ClaimsSource>>, ClaimsError> {
	if let Some(endpoint) = &config.user_endpoint {
		let source = EndpointClaimsSource::new(
			endpoint,
			config.user_endpoint_token.clone(),
			config.user_endpoint_timeout,
		)?;
		return Ok(Some(Arc::new(source)));
	}
	if let Some(path) = &config.user_file {
		return Ok(Some(Arc::new(FileClaimsSource::load(path)?)));
	}
	Ok(None)
}

fn is_zero(value: &u32) -> bool {
	*value == 0
}

fn is_false(value: &bool) -> bool {
	!*value
}

/// The claim set carried by an identity token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
	pub sub: String,
	pub origin: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exp: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	/// Number of sliding refreshes this token has been through.
	#[serde(default, skip_serializing_if = "is_zero")]
	pub refs: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub picture: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub domain: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub groups: Vec<String>,
	/// Set when custom claims were requested but could not be used.
	#[serde(default, skip_serializing_if = "is_false")]
	pub parse_error: bool,
	/// Custom claims without a reserved key.
	#[serde(flatten)]
	pub extra: CustomClaims,
}

impl Claims {
	pub fn from_identity(identity: &Identity) -> Self {
		Self {
			sub: identity.sub.clone(),
			origin: identity.origin.clone(),
			exp: identity.expiry.map(|e| e.timestamp()),
			email: identity.email.clone(),
			name: identity.name.clone(),
			picture: identity.picture.clone(),
			domain: identity.domain.clone(),
			groups: identity.groups.clone(),
			..Default::default()
		}
	}

	pub fn to_identity(&self) -> Identity {
		Identity {
			sub: self.sub.clone(),
			origin: self.origin.clone(),
			email: self.email.clone(),
			name: self.name.clone(),
			picture: self.picture.clone(),
			domain: self.domain.clone(),
			groups: self.groups.clone(),
			expiry: self.exp.and_then(|e| DateTime::<Utc>::from_timestamp(e, 0)),
		}
	}

	/// Overlay custom claims. `exp` is always kept; every other key from
	/// `custom` wins.
	///
	/// Fails when a custom value has the wrong shape for a reserved key or
	/// would clear the subject.
	pub fn merge_custom(&self, custom: CustomClaims) -> Result<Self, ClaimsError> {
		let mut merged = match serde_json::to_value(self) {
			Ok(Value::Object(map)) => map,
			Ok(_) => return Err(ClaimsError::Malformed("claims are not an object".to_string())),
			Err(e) => return Err(ClaimsError::Malformed(e.to_string())),
		};

		for (key, value) in custom {
			if key != "exp" {
				merged.insert(key, value);
			}
		}

		let claims: Claims = serde_json::from_value(Value::Object(merged))
			.map_err(|e| ClaimsError::Malformed(e.to_string()))?;
		if claims.sub.is_empty() {
			return Err(ClaimsError::Malformed("custom claims cleared 'sub'".to_string()));
		}
		Ok(claims)
	}
}
