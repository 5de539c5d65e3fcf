// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::Serialize;

/// Name and usage help of a registered backend or OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ProviderDescription {
	pub name: String,
	pub help_text: String,
}

impl ProviderDescription {
	pub fn new(name: impl Into<String>, help_text: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			help_text: help_text.into(),
		}
	}
}
