// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partially specified configuration produced by each source.

use serde::{Deserialize, Serialize};

use crate::sections::{
	ClaimsConfigLayer, CookieConfigLayer, HttpConfigLayer, JwtConfigLayer, LoggingConfigLayer,
	LoginConfigLayer, ProvidersConfigLayer, RedirectConfigLayer,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogsrvConfigLayer {
	pub http: Option<HttpConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
	pub jwt: Option<JwtConfigLayer>,
	pub login: Option<LoginConfigLayer>,
	pub redirect: Option<RedirectConfigLayer>,
	pub cookie: Option<CookieConfigLayer>,
	pub claims: Option<ClaimsConfigLayer>,
	pub providers: Option<ProvidersConfigLayer>,
}

macro_rules! merge_section {
	($self:ident, $other:ident, $field:ident) => {
		if let Some(other) = $other.$field {
			match &mut $self.$field {
				Some(existing) => existing.merge(other),
				None => $self.$field = Some(other),
			}
		}
	};
}

impl LogsrvConfigLayer {
	/// Overlay `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: Self) {
		merge_section!(self, other, http);
		merge_section!(self, other, logging);
		merge_section!(self, other, jwt);
		merge_section!(self, other, login);
		merge_section!(self, other, redirect);
		merge_section!(self, other, cookie);
		merge_section!(self, other, claims);
		merge_section!(self, other, providers);
	}
}
