// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use logsrv_login::{login_middleware, LoginHandler};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// The application router. The login middleware wraps every route,
/// including the fallback.
pub fn create_router(handler: Arc<LoginHandler>) -> Router {
	let login_path = handler.login_path().to_string();

	Router::new()
		.route("/health", get(health))
		.route(&login_path, get(crate::page::login_page))
		.fallback(not_found)
		.with_state(handler.clone())
		.layer(from_fn_with_state(handler, login_middleware))
		.layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}

async fn not_found() -> (StatusCode, &'static str) {
	(StatusCode::NOT_FOUND, "Not found")
}
