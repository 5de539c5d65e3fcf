// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing of provider option lists in `key1=value1,key2=value2` form.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Flat option map handed to a backend factory or an OAuth flow configuration.
pub type ProviderOptions = BTreeMap<String, String>;

/// Option key naming the provider in a `--backend` / `--oauth` argument.
pub const PROVIDER_KEY: &str = "provider";

/// Parse `key1=value1,key2=value2`.
///
/// Every pair must contain `=`; values may themselves contain `=`.
pub fn parse_options(list: &str) -> Result<ProviderOptions, ConfigError> {
	list.split(',')
		.map(|pair| {
			pair.split_once('=')
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.ok_or_else(|| ConfigError::InvalidValue {
					key: "provider options".to_string(),
					message: format!(
						"provider configuration has to be in form 'key1=value1,key2=..', but was '{pair}'"
					),
				})
		})
		.collect()
}

/// Parse `provider=<name>,key=value,...` into the provider name and its options.
pub fn parse_provider_spec(spec: &str) -> Result<(String, ProviderOptions), ConfigError> {
	let mut options = parse_options(spec)?;
	match options.remove(PROVIDER_KEY) {
		Some(name) if !name.is_empty() => Ok((name, options)),
		_ => Err(ConfigError::InvalidValue {
			key: PROVIDER_KEY.to_string(),
			message: format!("missing '{PROVIDER_KEY}=<name>' in '{spec}'"),
		}),
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn joined_pairs_parse_back(pairs in proptest::collection::btree_map("[a-z_]{1,10}", "[a-zA-Z0-9=:/.]{0,16}", 1..6)) {
			let list = pairs
				.iter()
				.map(|(k, v)| format!("{k}={v}"))
				.collect::<Vec<_>>()
				.join(",");
			prop_assert_eq!(parse_options(&list).unwrap(), pairs);
		}
	}
}
