// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for logsrv.
//!
//! This crate provides:
//! - A pre-configured HTTP client with consistent User-Agent header and a
//!   bounded timeout
//! - Cookie extraction and `Set-Cookie` rendering

mod client;
pub mod cookie;

pub use client::{builder, new_client, new_client_with_timeout, user_agent, DEFAULT_TIMEOUT};
pub use self::cookie::{extract_cookie, Cookie, SameSite};
