// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised when an [`Identity`](crate::Identity) violates its invariants.
#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
	#[error("identity subject must not be empty")]
	EmptySubject,

	#[error("identity origin must not be empty")]
	EmptyOrigin,
}
