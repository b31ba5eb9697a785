// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared plumbing for calls to external data services.
//!
//! Every upstream call is classified into one of three outcomes:
//! - `Ok(Some(body))`: success with a payload
//! - `Ok(None)`: expected absence (404, 204)
//! - `Err(SourceError)`: the upstream could not be used (network, status, decode)

use serde::de::DeserializeOwned;
use std::time::Duration;

/// Failure of a single upstream attempt.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{upstream} unavailable: {detail}")]
    Unavailable {
        upstream: &'static str,
        detail: String,
    },

    #[error("{upstream} returned malformed payload: {detail}")]
    Malformed {
        upstream: &'static str,
        detail: String,
    },
}

impl SourceError {
    pub fn unavailable(upstream: &'static str, detail: impl ToString) -> Self {
        SourceError::Unavailable {
            upstream,
            detail: detail.to_string(),
        }
    }

    pub fn malformed(upstream: &'static str, detail: impl ToString) -> Self {
        SourceError::Malformed {
            upstream,
            detail: detail.to_string(),
        }
    }
}

/// Build an HTTP client with a per-request timeout.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// Send a request and return the raw body on success.
///
/// Errors never carry the request URL, which may hold credentials.
pub async fn fetch_text(
    request: reqwest::RequestBuilder,
    upstream: &'static str,
) -> Result<Option<String>, SourceError> {
    let response = request
        .send()
        .await
        .map_err(|e| SourceError::unavailable(upstream, e.without_url()))?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::NO_CONTENT {
        return Ok(None);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 429 {
            tracing::warn!(upstream, "Rate limit hit (429)");
        }
        return Err(SourceError::unavailable(
            upstream,
            format!("HTTP {}: {}", status, truncate(&body, 200)),
        ));
    }

    let body = response
        .text()
        .await
        .map_err(|e| SourceError::unavailable(upstream, e.without_url()))?;

    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(body))
}

/// Send a request and decode a JSON body on success.
pub async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    upstream: &'static str,
) -> Result<Option<T>, SourceError> {
    match fetch_text(request, upstream).await? {
        Some(body) => serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| SourceError::malformed(upstream, e)),
        None => Ok(None),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
