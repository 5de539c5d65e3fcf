// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity token issuance and verification.
//!
//! Tokens are HMAC-signed JWTs. The issuer owns `exp` and `iat`; a
//! configured [`ClaimsSource`] may add or override any other claim. When the
//! claims source fails, the token is still issued with `parse_error` set.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use logsrv_common_core::Identity;
use logsrv_config::JwtConfig;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::claims::{Claims, ClaimsSource};

#[derive(Debug, Error)]
pub enum TokenError {
	#[error("unsupported signing algorithm: {0}")]
	UnsupportedAlgorithm(String),

	#[error("signing secret is empty")]
	EmptySecret,

	#[error("invalid token signature")]
	InvalidSignature,

	#[error("token expired")]
	Expired,

	#[error("malformed token: {0}")]
	Malformed(String),

	#[error("failed to sign token: {0}")]
	Signing(String),

	#[error("token reached the maximum of {max} refreshes")]
	MaxRefreshesReached { max: u32 },
}

/// Signs and verifies identity tokens.
pub struct TokenIssuer {
	algorithm: Algorithm,
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	expiry: Duration,
	max_refreshes: u32,
	claims_source: Option<Arc<dyn ClaimsSource>>,
}

impl TokenIssuer {
	pub fn new(
		config: &JwtConfig,
		claims_source: Option<Arc<dyn ClaimsSource>>,
	) -> Result<Self, TokenError> {
		let algorithm = match config.algo.to_ascii_uppercase().as_str() {
			"HS256" => Algorithm::HS256,
			"HS384" => Algorithm::HS384,
			"HS512" => Algorithm::HS512,
			other => return Err(TokenError::UnsupportedAlgorithm(other.to_string())),
		};
		if config.secret.is_empty() {
			return Err(TokenError::EmptySecret);
		}

		let secret = config.secret.expose().as_bytes();
		Ok(Self {
			algorithm,
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			expiry: config.expiry,
			max_refreshes: config.refreshes,
			claims_source,
		})
	}

	pub fn expiry(&self) -> Duration {
		self.expiry
	}

	pub fn max_refreshes(&self) -> u32 {
		self.max_refreshes
	}

	/// Build the claim set for `identity` with `exp = now + expiry`.
	///
	/// Never fails: a claims source error only sets `parse_error`.
	#[instrument(skip_all, fields(sub = %identity.sub, origin = %identity.origin, refs = refs))]
	pub async fn issue_claims(&self, identity: &Identity, refs: u32) -> Claims {
		let now = Utc::now().timestamp();
		let expiry = i64::try_from(self.expiry.as_secs()).unwrap_or(i64::MAX);

		let mut claims = Claims::from_identity(identity);
		claims.iat = Some(now);
		claims.exp = Some(now.saturating_add(expiry));
		claims.refs = refs;

		let Some(source) = &self.claims_source else {
			return claims;
		};

		let merged = match source.claims_for(identity).await {
			Ok(Some(custom)) => claims.merge_custom(custom),
			Ok(None) => return claims,
			Err(e) => Err(e),
		};
		match merged {
			Ok(merged) => merged,
			Err(e) => {
				warn!(error = %e, "custom claims unavailable, issuing token without them");
				claims.parse_error = true;
				claims
			}
		}
	}

	pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
		encode(&Header::new(self.algorithm), claims, &self.encoding_key)
			.map_err(|e| TokenError::Signing(e.to_string()))
	}

	/// Parse and verify a token. `exp` is checked when present, with no
	/// leeway.
	pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
		let mut validation = Validation::new(self.algorithm);
		validation.leeway = 0;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();

		decode::<Claims>(token, &self.decoding_key, &validation)
			.map(|data| data.claims)
			.map_err(|e| match e.kind() {
				ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
					TokenError::InvalidSignature
				}
				ErrorKind::ExpiredSignature => TokenError::Expired,
				_ => TokenError::Malformed(e.to_string()),
			})
	}

	/// Re-issue verified `claims` with a fresh expiry, counting the refresh.
	pub async fn refresh(&self, claims: &Claims) -> Result<Claims, TokenError> {
		if claims.refs >= self.max_refreshes {
			return Err(TokenError::MaxRefreshesReached {
				max: self.max_refreshes,
			});
		}
		debug!(sub = %claims.sub, refs = claims.refs + 1, "refreshing token");
		Ok(self.issue_claims(&claims.to_identity(), claims.refs + 1).await)
	}
}

impl std::fmt::Debug for TokenIssuer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenIssuer")
			.field("algorithm", &self.algorithm)
			.field("expiry", &self.expiry)
			.field("max_refreshes", &self.max_refreshes)
			.field("claims_source", &self.claims_source.is_some())
			.finish()
	}
}



#[cfg(test)]
mod proptests {
	use super::test_support::issuer;
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn signed_claims_verify_unchanged(
			sub in "[a-zA-Z0-9@._-]{1,40}",
			origin in "[a-z]{1,12}",
			groups in proptest::collection::vec("[a-z]{1,8}", 0..4),
			refs in 0u32..5,
		) {
			let issuer = issuer();
			let claims = Claims {
				exp: Some(Utc::now().timestamp() + 600),
				refs,
				..Claims::from_identity(&Identity::new(sub, origin).with_groups(groups))
			};
			let verified = issuer.verify(&issuer.sign(&claims).unwrap()).unwrap();
			prop_assert_eq!(verified, claims);
		}
	}
}
