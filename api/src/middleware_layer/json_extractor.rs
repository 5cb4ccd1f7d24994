use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

const REQUEST_ID: &str = "X-Request-Id";

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    ["message", "question", "history"]
        .into_iter()
        .find(|key| msg.contains(key))
        .map(str::to_string)
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) {
    let present = parts
        .headers
        .get(REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| !v.trim().is_empty());
    if present {
        return;
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    if let Ok(id) = HeaderValue::from_str(&format!("req-{nanos}")) {
        parts.headers.insert(REQUEST_ID, id);
    }
}

fn is_envelope(bytes: &Bytes) -> bool {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .and_then(|v| v.get("success").cloned())
        .is_some()
}

/// Rewrites plain-text 400/422 bodies (axum's extractor rejections) into the
/// JSON error envelope. Bodies already in envelope form pass through.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY) {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    ensure_request_id(&mut parts);
    if is_envelope(&bytes) {
        return Response::from_parts(parts, bytes.into());
    }

    let original = String::from_utf8_lossy(&bytes);
    let detail = ApiErrorDetail {
        path: guess_path_from_serde_msg(&original),
        hint: if original.contains("missing field") {
            Some("Send a JSON object such as { \"message\": \"What is PTO?\" }.".into())
        } else if original.contains("expected a sequence") {
            Some("`history` must be an array.".into())
        } else {
            None
        },
    };

    let envelope = ApiResponse::<()>::error(
        if status == StatusCode::BAD_REQUEST {
            "BAD_REQUEST"
        } else {
            "UNPROCESSABLE_ENTITY"
        },
        original.trim(),
        vec![detail],
    );

    let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| bytes.to_vec());

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}
