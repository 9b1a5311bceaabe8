//! Request span carrying a trace id, plus a completion record with status
//! and latency.
//!
//! The id is taken from an incoming `x-trace-id` header when that parses as
//! a UUID, otherwise generated, and always echoed on the response.  JSON
//! request bodies whose declared length is at most [`MAX_LOGGED_BODY`] bytes
//! are logged at `debug`; other bodies are streamed through untouched.

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

pub const X_TRACE_ID: &str = "x-trace-id";

const MAX_LOGGED_BODY: usize = 1024;

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let trace_id = incoming_trace_id(&req).unwrap_or_else(Uuid::new_v4);
    let span = info_span!(
        "request",
        %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let handled = async move {
        debug!("request received");
        let req = match log_json_body(req).await {
            Ok(req) => req,
            Err(resp) => return resp,
        };
        let resp = next.run(req).await;
        info!(
            status = resp.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        resp
    }
    .instrument(span)
    .await;

    with_trace_header(handled, trace_id)
}

fn incoming_trace_id(req: &Request<Body>) -> Option<Uuid> {
    let raw = req.headers().get(X_TRACE_ID)?.to_str().ok()?;
    Uuid::parse_str(raw).ok()
}

fn with_trace_header(mut resp: Response, trace_id: Uuid) -> Response {
    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        resp.headers_mut().insert(X_TRACE_ID, value);
    }
    resp
}

/// Buffer small JSON bodies so they can be logged, then hand the request on.
async fn log_json_body(req: Request<Body>) -> Result<Request<Body>, Response> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json || !tracing::enabled!(tracing::Level::DEBUG) {
        return Ok(req);
    }
    match declared_length(req.headers()) {
        Some(len) if len <= MAX_LOGGED_BODY => {}
        len => {
            debug!(declared_length = ?len, "request body not logged");
            return Ok(req);
        }
    }

    let (parts, body) = req.into_parts();
    let bytes: Bytes = match http_body_util::Limited::new(body, MAX_LOGGED_BODY).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Err((StatusCode::BAD_REQUEST, format!("failed to read request body: {e}"))
                .into_response());
        }
    };
    debug!(body = %String::from_utf8_lossy(&bytes), "request body");
    Ok(Request::from_parts(parts, Body::from(bytes)))
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
