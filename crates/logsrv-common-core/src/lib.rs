// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

pub mod error;
pub mod identity;
pub mod provider;

pub use error::*;
pub use identity::*;
pub use provider::*;
