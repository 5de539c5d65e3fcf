// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod claims;
mod cookie;
mod http;
mod jwt;
mod logging;
mod login;
mod providers;
mod redirect;

pub use claims::{ClaimsConfig, ClaimsConfigLayer};
pub use cookie::{CookieConfig, CookieConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use jwt::{JwtConfig, JwtConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use login::{LoginConfig, LoginConfigLayer};
pub use providers::{ProvidersConfig, ProvidersConfigLayer};
pub use redirect::{RedirectConfig, RedirectConfigLayer};
