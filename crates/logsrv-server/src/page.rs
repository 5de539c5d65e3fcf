// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Static login page.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::Html;
use logsrv_login::{CurrentIdentity, LoginHandler};

pub async fn login_page(
	State(handler): State<Arc<LoginHandler>>,
	request: Request,
) -> Html<String> {
	let identity = request.extensions().get::<CurrentIdentity>();
	Html(render(&handler, identity))
}

fn render(handler: &LoginHandler, identity: Option<&CurrentIdentity>) -> String {
	let login_path = escape(handler.login_path());
	let body = match identity {
		Some(CurrentIdentity(claims)) => format!(
			"<p>Logged in as <strong>{}</strong> via {}.</p>\n\
			 <form method=\"post\" action=\"{login_path}\">\n\
			 <input type=\"hidden\" name=\"logout\" value=\"true\">\n\
			 <button type=\"submit\">Logout</button>\n\
			 </form>",
			escape(&claims.sub),
			escape(&claims.origin),
		),
		None => login_forms(handler, &login_path),
	};

	format!(
		"<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Login</title></head>\n\
		 <body>\n{body}\n</body>\n</html>\n"
	)
}

fn login_forms(handler: &LoginHandler, login_path: &str) -> String {
	let mut out = String::new();

	if !handler.backend_names().is_empty() {
		out.push_str(&format!(
			"<form method=\"post\" action=\"{login_path}\">\n\
			 <input type=\"text\" name=\"username\" placeholder=\"Username\" autofocus>\n\
			 <input type=\"password\" name=\"password\" placeholder=\"Password\">\n\
			 <button type=\"submit\">Login</button>\n\
			 </form>\n"
		));
	}

	let providers = handler.oauth_names();
	if !providers.is_empty() {
		out.push_str("<ul>\n");
		for name in providers {
			let name = escape(&name);
			out.push_str(&format!(
				"<li><a href=\"{login_path}/{name}\">Login with {name}</a></li>\n"
			));
		}
		out.push_str("</ul>\n");
	}
	out
}

fn escape(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			c => out.push(c),
		}
	}
	out
}
