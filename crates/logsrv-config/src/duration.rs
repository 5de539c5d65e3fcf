// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Serde adapters for humantime duration strings such as `"24h"` or `"5s"`.

pub mod option {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(duration) => {
				serializer.serialize_some(&humantime::format_duration(*duration).to_string())
			}
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw: Option<String> = Option::deserialize(deserializer)?;
		raw.map(|r| humantime::parse_duration(&r).map_err(serde::de::Error::custom))
			.transpose()
	}
}
