// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A backend over a fixed `user=password` map from its options.

use async_trait::async_trait;
use logsrv_common_core::{Identity, ProviderDescription};
use logsrv_common_secret::SecretString;
use logsrv_config::ProviderOptions;
use std::collections::HashMap;

use crate::backend::{Backend, BackendRegistry};
use crate::error::BackendError;

pub const SIMPLE_PROVIDER_NAME: &str = "simple";

pub fn description() -> ProviderDescription {
	ProviderDescription::new(
		SIMPLE_PROVIDER_NAME,
		"Simple login backend opts: user1=password,user2=password,..",
	)
}

/// Register the simple backend factory.
pub fn register(registry: &mut BackendRegistry) {
	registry.register(description(), |options| {
		Ok(Box::new(SimpleBackend::from_options(options)?) as Box<dyn Backend>)
	});
}

#[derive(Debug)]
pub struct SimpleBackend {
	users: HashMap<String, SecretString>,
}

impl SimpleBackend {
	pub fn from_options(options: &ProviderOptions) -> Result<Self, BackendError> {
		if options.is_empty() {
			return Err(BackendError::Config(
				"no users provided for simple backend".to_string(),
			));
		}
		Ok(Self {
			users: options
				.iter()
				.map(|(user, password)| (user.clone(), SecretString::new(password.clone())))
				.collect(),
		})
	}
}

#[async_trait]
impl Backend for SimpleBackend {
	async fn authenticate(
		&self,
		username: &str,
		password: &str,
	) -> Result<Option<Identity>, BackendError> {
		Ok(self
			.users
			.get(username)
			.filter(|expected| expected.expose() == password)
			.map(|_| Identity::new(username, SIMPLE_PROVIDER_NAME)))
	}
}
