// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie middleware.

use crate::services::session::{is_valid_session_id, new_session_id};
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const SESSION_COOKIE: &str = "geo_session";

/// Session id extracted from (or assigned to) the request.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Middleware that guarantees every request carries a session id.
///
/// A missing or malformed cookie gets a fresh id, sent back in `Set-Cookie`.
pub async fn ensure_session(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let existing = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| is_valid_session_id(v));

    let (id, is_new) = match existing {
        Some(id) => (id, false),
        None => {
            let id = new_session_id().map_err(|e| {
                tracing::error!(error = %e, "Failed to create session id");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            (id, true)
        }
    };

    request.extensions_mut().insert(SessionId(id.clone()));
    let response = next.run(request).await;

    if !is_new {
        return Ok(response);
    }

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((jar.add(cookie), response).into_response())
}
