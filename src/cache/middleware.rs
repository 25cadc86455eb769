//! Response cache middleware.
//!
//! Serves cached renders of public GET routes and stores fresh ones. Only
//! query-less requests participate: invalidation is path-keyed, so a cached
//! variant per query string would dodge the revalidation webhook.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::{debug, instrument};

use super::store::{CachedEntry, ResponseCache};

/// Responses larger than this are served but not cached.
const MAX_CACHED_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct CacheState {
    pub cache: Arc<ResponseCache>,
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(state): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::GET || request.uri().query().is_some() {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();

    if let Some(entry) = state.cache.get(&path) {
        counter!("vetrina_response_cache_hit_total").increment(1);
        debug!(outcome = "hit", "serving cached response");
        return entry.into_response();
    }

    counter!("vetrina_response_cache_miss_total").increment(1);
    debug!(outcome = "miss", "executing handler");

    let response = next.run(request).await;
    if !should_store(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => {
            let entry = CachedEntry::new(parts.status, &parts.headers, bytes.clone());
            state.cache.put(path, entry);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(error) => {
            debug!(error = %error, "failed to buffer response for caching");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn should_store(response: &Response) -> bool {
    if response.status() != StatusCode::OK {
        return false;
    }

    if response.headers().contains_key(header::SET_COOKIE) {
        return false;
    }

    // Degraded fallback renders opt out so a transient fetch failure is not
    // served for a whole revalidation interval.
    let no_store = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("no-store"));
    if no_store {
        return false;
    }

    // An announced oversized body is served untouched rather than buffered.
    declared_length(response).is_none_or(|length| length <= MAX_CACHED_BODY_BYTES)
}

fn declared_length(response: &Response) -> Option<usize> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn only_plain_ok_responses_are_stored() {
        let ok = StatusCode::OK.into_response();
        assert!(should_store(&ok));

        let not_found = StatusCode::NOT_FOUND.into_response();
        assert!(!should_store(&not_found));

        let mut with_cookie = StatusCode::OK.into_response();
        with_cookie.headers_mut().insert(
            header::SET_COOKIE,
            axum::http::HeaderValue::from_static("session=1"),
        );
        assert!(!should_store(&with_cookie));

        let mut no_store = StatusCode::OK.into_response();
        no_store.headers_mut().insert(
            header::CACHE_CONTROL,
            axum::http::HeaderValue::from_static("no-store"),
        );
        assert!(!should_store(&no_store));
    }
}
