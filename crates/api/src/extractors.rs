//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, header::HOST, request::Parts},
};
use serde::Deserialize;

use crate::AppState;

#[derive(Deserialize)]
struct ApiKeyParams {
    api_key: Option<String>,
}

/// Credential presented with the request, from the `api_key` query parameter.
///
/// Never rejects: a missing or unparsable query yields `None`, and the access
/// gate decides what that means.
///
/// ```ignore
/// async fn handler(ApiKey(key): ApiKey) -> impl IntoResponse {
///     state.images.authorize(key.as_deref())?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApiKey(pub Option<String>);

impl ApiKey {
    /// Borrow the credential.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = Query::<ApiKeyParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.api_key);
        Ok(Self(key))
    }
}

/// Base URL for links handed back to clients, always ending in `/`.
///
/// Uses the configured public URL when present, otherwise the request's
/// `Host` header and `X-Forwarded-Proto` (default `http`).
#[derive(Debug, Clone)]
pub struct BaseUrl(pub String);

impl FromRequestParts<AppState> for BaseUrl {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let url = match &state.public_url {
            Some(public) => with_trailing_slash(public),
            None => from_headers(&parts.headers, parts.uri.authority().map(|a| a.as_str())),
        };
        Ok(Self(url))
    }
}

fn from_headers(headers: &HeaderMap, authority: Option<&str>) -> String {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or(authority)
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .filter(|proto| matches!(*proto, "http" | "https"))
        .unwrap_or("http");

    format!("{scheme}://{host}/")
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
