// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The result of a successful authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::IdentityError;

/// An authenticated user as reported by a credential backend or OAuth provider.
///
/// Produced fresh by every authentication attempt and never stored server side.
/// The token issuer copies every field into the signed claim set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Opaque subject identifier, e.g. a username or an email address.
	pub sub: String,
	/// Name of the backend or OAuth provider that produced this identity.
	pub origin: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub picture: Option<String>,
	/// Hosted domain, set by providers that know it (Google `hd`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub domain: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub groups: Vec<String>,
	/// Absolute expiry, filled in by the token issuer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expiry: Option<DateTime<Utc>>,
}

impl Identity {
	pub fn new(sub: impl Into<String>, origin: impl Into<String>) -> Self {
		Self {
			sub: sub.into(),
			origin: origin.into(),
			..Default::default()
		}
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
		self.picture = Some(picture.into());
		self
	}

	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	pub fn with_groups<I, S>(mut self, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.groups = groups.into_iter().map(Into::into).collect();
		self
	}

	/// Checks that subject and origin are both present.
	pub fn validate(&self) -> Result<(), IdentityError> {
		if self.sub.is_empty() {
			return Err(IdentityError::EmptySubject);
		}
		if self.origin.is_empty() {
			return Err(IdentityError::EmptyOrigin);
		}
		Ok(())
	}
}
