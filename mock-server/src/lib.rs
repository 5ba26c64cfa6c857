//! Canned HTTP responses for exercising the connector over real sockets.
//!
//! Every route returns a fixed body with a fixed content type, except
//! `/echo`, which reflects the request back as JSON, and `/status/{code}`,
//! which answers with an empty body and the requested status.

use std::collections::BTreeMap;

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/json/ok", get(json_ok))
        .route("/json/error", get(json_error))
        .route("/xml", get(xml_document))
        .route("/html/missing", get(html_missing))
        .route("/text/maintenance", get(text_maintenance))
        .route("/empty", get(empty))
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn json_ok() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

async fn json_error() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": {"message": "bad token"}})),
    )
}

async fn xml_document() -> Response {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        r#"<?xml version="1.0"?><inventory region="eu"><item>bolt</item><item>nut</item></inventory>"#,
    )
        .into_response()
}

async fn html_missing() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        "<html><body>Not Found</body></html>",
    )
        .into_response()
}

async fn text_maintenance() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::CONTENT_TYPE, "text/plain")],
        "down for {maintenance}",
    )
        .into_response()
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body,
    })
}
