//! The Router's transparent reverse proxy (spec §4.2 "Proxy semantics",
//! §9 "Streaming proxy"). Bodies are streamed in both directions so a
//! backend's `text/event-stream` completion is not buffered before the
//! first byte reaches the client.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::response::Response;
use fleet_common::ErrorEnvelope;

use crate::selection;
use crate::RouterState;

const PROXY_TIMEOUT: Duration = Duration::from_secs(300);

/// Request headers that must not be forwarded verbatim to the chosen
/// backend (hop-by-hop headers plus anything host-identifying).
const STRIPPED_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

pub async fn handle(
    State(state): State<Arc<RouterState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let healthy = state.pool.healthy();
    let Some(member) = selection::select(&healthy, &state.pool.cursor) else {
        return ErrorEnvelope::response(
            StatusCode::SERVICE_UNAVAILABLE,
            "No healthy services available",
        );
    };

    let path_and_query = uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", member.url.trim_end_matches('/'), path_and_query);

    let mut forward_headers = reqwest::header::HeaderMap::new();
    for (name, value) in headers.iter() {
        if STRIPPED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let Ok(value) = reqwest::header::HeaderValue::from_bytes(value.as_bytes()) {
            if let Ok(name) = reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()) {
                forward_headers.insert(name, value);
            }
        }
    }

    let reqwest_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .unwrap_or(reqwest::Method::GET);
    let body_stream = body.into_data_stream();

    member.request_count.fetch_add(1, Ordering::Relaxed);
    tracing::info!(method = %method, path = %path_and_query, backend = %member.name, "proxying request");

    let outcome = state
        .http
        .request(reqwest_method, &target)
        .headers(forward_headers)
        .body(reqwest::Body::wrap_stream(body_stream))
        .timeout(PROXY_TIMEOUT)
        .send()
        .await;

    match outcome {
        Ok(upstream) => {
            let status = upstream.status();
            let mut response_headers = HeaderMap::new();
            for (name, value) in upstream.headers().iter() {
                if let (Ok(name), Ok(value)) = (
                    HeaderName::from_bytes(name.as_str().as_bytes()),
                    axum::http::HeaderValue::from_bytes(value.as_bytes()),
                ) {
                    response_headers.insert(name, value);
                }
            }
            tracing::info!(method = %method, path = %path_and_query, backend = %member.name, status = status.as_u16(), "proxied request completed");

            let body = Body::from_stream(upstream.bytes_stream());
            let mut response = Response::new(body);
            *response.status_mut() =
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            *response.headers_mut() = response_headers;
            response
        }
        Err(e) => {
            if e.is_timeout() {
                ErrorEnvelope::response(StatusCode::GATEWAY_TIMEOUT, "Service timeout")
            } else {
                member.error_count.fetch_add(1, Ordering::Relaxed);
                ErrorEnvelope::response(StatusCode::BAD_GATEWAY, "Service error")
            }
        }
    }
}
