// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret wrapper for sensitive values.
//!
//! [`Secret<T>`] keeps JWT signing secrets, OAuth client secrets, access tokens
//! and claims endpoint tokens out of logs. Both `Debug` and `Display` print
//! [`REDACTED`]; the inner value is only reachable through [`Secret::expose`]
//! and is zeroized when the wrapper is dropped.
//!
//! ```
//! use logsrv_common_secret::SecretString;
//!
//! let secret = SecretString::new("hunter2".to_string());
//! assert_eq!(format!("{secret:?}"), "Secret([REDACTED])");
//! assert_eq!(secret.expose(), "hunter2");
//! ```

use std::fmt;

use zeroize::Zeroize;

/// Placeholder printed instead of a secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never appear in logs or error messages.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret<T: Zeroize>(T);

/// The common case: a secret string.
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	pub fn new(value: T) -> Self {
		Self(value)
	}

	/// Access the wrapped value. Call sites should be easy to grep for.
	pub fn expose(&self) -> &T {
		&self.0
	}
}

impl SecretString {
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<T: Zeroize> Drop for Secret<T> {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

impl<T: Zeroize> From<T> for Secret<T> {
	fn from(value: T) -> Self {
		Self(value)
	}
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Secret({REDACTED})")
	}
}

impl<T: Zeroize> fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Secret<T>
where
	T: Zeroize + serde::Deserialize<'de>,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		T::deserialize(deserializer).map(Secret)
	}
}

/// Serializing a secret never writes the value.
#[cfg(feature = "serde")]
impl<T: Zeroize> serde::Serialize for Secret<T> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn secret_never_in_debug_or_display(value in "[a-zA-Z0-9]{8,40}") {
			prop_assume!(!value.contains("REDACTED"));
			prop_assume!(!value.contains("Secret"));

			let secret = SecretString::new(value.clone());
			let debug_out = format!("{secret:?}");
			let display_out = format!("{secret}");
			prop_assert!(!debug_out.contains(&value));
			prop_assert!(!display_out.contains(&value));
		}
	}
}
