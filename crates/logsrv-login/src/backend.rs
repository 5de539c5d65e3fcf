// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential backends and their registry.
//!
//! The registry maps a provider name to a factory that builds a [`Backend`]
//! from its option map. The composition root registers every known backend
//! before the server starts; registering after requests are being served is
//! unsupported.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use logsrv_common_core::{Identity, ProviderDescription};
use logsrv_config::ProviderOptions;
use tracing::{debug, warn};

use crate::error::BackendError;

/// Checks a username and password against some credential store.
#[async_trait]
pub trait Backend: Send + Sync {
	/// `Ok(Some(_))` on a match, `Ok(None)` on a mismatch, `Err` only for
	/// failures of the backend itself.
	async fn authenticate(
		&self,
		username: &str,
		password: &str,
	) -> Result<Option<Identity>, BackendError>;
}

/// Builds a backend from its option map, validating the options.
pub type BackendFactory =
	Arc<dyn Fn(&ProviderOptions) -> Result<Box<dyn Backend>, BackendError> + Send + Sync>;

#[derive(Clone)]
struct Entry {
	description: ProviderDescription,
	factory: BackendFactory,
}

/// Name to backend factory mapping.
#[derive(Clone, Default)]
pub struct BackendRegistry {
	entries: HashMap<String, Entry>,
}

impl BackendRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a factory under `description.name`.
	///
	/// The last registration for a name wins; replacing an entry is logged at
	/// `warn` and the replaced description is returned.
	pub fn register<F>(
		&mut self,
		description: ProviderDescription,
		factory: F,
	) -> Option<ProviderDescription>
	where
		F: Fn(&ProviderOptions) -> Result<Box<dyn Backend>, BackendError> + Send + Sync + 'static,
	{
		let name = description.name.clone();
		let previous = self.entries.insert(
			name.clone(),
			Entry {
				description,
				factory: Arc::new(factory),
			},
		);
		match &previous {
			Some(_) => warn!(provider = %name, "backend registered twice, keeping the last registration"),
			None => debug!(provider = %name, "registered backend"),
		}
		previous.map(|entry| entry.description)
	}

	pub fn lookup(&self, name: &str) -> Option<BackendFactory> {
		self.entries.get(name).map(|entry| entry.factory.clone())
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.entries.keys().cloned().collect();
		names.sort();
		names
	}

	pub fn descriptions(&self) -> Vec<ProviderDescription> {
		let mut descriptions: Vec<_> = self
			.entries
			.values()
			.map(|entry| entry.description.clone())
			.collect();
		descriptions.sort();
		descriptions
	}
}

impl std::fmt::Debug for BackendRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BackendRegistry")
			.field("names", &self.names())
			.finish()
	}
}
