//! `GET /ready` (spec §6, §4.9): always `200`, echoing back the
//! incoming request's `Host` header. Runs on `HTTP_URL` alongside the
//! gRPC server; it does not gate the gRPC server's own availability.

use axum::http::{header, HeaderMap};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::json;

async fn ready(headers: HeaderMap) -> Json<serde_json::Value> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    Json(json!({ "host": host }))
}

pub fn router() -> Router {
    Router::new().route("/ready", get(ready))
}
