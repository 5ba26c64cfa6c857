//! Response classification: one verdict for any content type.
//!
//! # Design
//! The declared `Content-Type` picks a `ContentCategory` (XML, JSON, HTML,
//! empty, plain text, checked in that order) and each category has one pure
//! function that turns the response into an `Outcome`. Status codes in
//! `200..400` count as success everywhere; a body that cannot be parsed as
//! its declared format is a failure whatever the status.
//!
//! The content type wins over emptiness: an empty body declared as JSON or
//! XML fails to parse instead of being treated as an empty success.

use serde::Serialize;
use serde_json::Value;

use crate::html;
use crate::http::HttpResponse;
use crate::normalize::{escape_braces, normalize};
use crate::xml;

/// Body format derived from the declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCategory {
    Xml,
    Json,
    Html,
    Empty,
    PlainText,
}

impl ContentCategory {
    /// Case-insensitive substring match on `content_type`; `body` only
    /// matters when no known format is declared.
    pub fn detect(content_type: &str, body: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("xml") {
            ContentCategory::Xml
        } else if is_json_type(&content_type) {
            ContentCategory::Json
        } else if content_type.contains("html") {
            ContentCategory::Html
        } else if body.is_empty() {
            ContentCategory::Empty
        } else {
            ContentCategory::PlainText
        }
    }

    pub fn of(response: &HttpResponse) -> Self {
        Self::detect(response.content_type(), &response.body)
    }
}

/// True for JSON and JavaScript content types.
pub fn is_json_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("json") || content_type.contains("javascript")
}

pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// A parsed response body, typed by the category it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedBody {
    Json(Value),
    Xml(Value),
    Text(String),
}

impl ParsedBody {
    pub fn to_value(&self) -> Value {
        match self {
            ParsedBody::Json(value) | ParsedBody::Xml(value) => value.clone(),
            ParsedBody::Text(text) => Value::String(text.clone()),
        }
    }
}

/// Verdict for one response. `parsed` is `None` for empty bodies and for
/// bodies that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub parsed: Option<ParsedBody>,
    pub message: Option<String>,
}

impl Outcome {
    pub fn success(parsed: Option<ParsedBody>) -> Self {
        Outcome {
            success: true,
            parsed,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>, parsed: Option<ParsedBody>) -> Self {
        Outcome {
            success: false,
            parsed,
            message: Some(message.into()),
        }
    }
}

pub fn classify(response: &HttpResponse) -> Outcome {
    match ContentCategory::of(response) {
        ContentCategory::Xml => classify_xml(response),
        ContentCategory::Json => classify_json(response),
        ContentCategory::Html => classify_html(response),
        ContentCategory::Empty => classify_empty(response),
        ContentCategory::PlainText => classify_text(response),
    }
}

fn classify_xml(response: &HttpResponse) -> Outcome {
    let document = match xml::parse(&response.body) {
        Ok(document) => document,
        Err(err) => {
            return Outcome::failure(
                format!("Unable to parse XML response. Error: {}", normalize(&err)),
                None,
            );
        }
    };

    let parsed = Some(ParsedBody::Xml(document));
    if is_success_status(response.status) {
        return Outcome::success(parsed);
    }
    Outcome::failure(server_error(response.status, &escape_braces(&response.body)), parsed)
}

fn classify_json(response: &HttpResponse) -> Outcome {
    let value: Value = match serde_json::from_str(&response.body) {
        Ok(value) => value,
        Err(err) => {
            return Outcome::failure(
                format!("Unable to parse JSON response. Error: {}", normalize(&err)),
                None,
            );
        }
    };

    if is_success_status(response.status) {
        return Outcome::success(Some(ParsedBody::Json(value)));
    }

    let detail = match error_field(&value) {
        Some(detail) => escape_braces(&detail),
        None => escape_braces(&response.body),
    };
    Outcome::failure(
        server_error(response.status, &detail),
        Some(ParsedBody::Json(value)),
    )
}

/// `error.message` when `error` is an object carrying one, else `error`.
fn error_field(value: &Value) -> Option<String> {
    let error = value.as_object()?.get("error")?;
    let detail = match error {
        Value::Object(fields) => fields.get("message").unwrap_or(error),
        _ => error,
    };
    Some(match detail {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

fn classify_html(response: &HttpResponse) -> Outcome {
    let text = html::visible_text(&response.body);
    if is_success_status(response.status) {
        return Outcome::success(Some(ParsedBody::Text(text)));
    }

    let message = format!(
        "Status Code: {}. Data from server:\n{}\n",
        response.status,
        unquote_plus(&text)
    );
    Outcome::failure(escape_braces(&message), Some(ParsedBody::Text(text)))
}

fn classify_empty(response: &HttpResponse) -> Outcome {
    if is_success_status(response.status) {
        return Outcome::success(None);
    }
    Outcome::failure("Empty response and no information in the header", None)
}

fn classify_text(response: &HttpResponse) -> Outcome {
    let parsed = Some(ParsedBody::Text(response.body.clone()));
    if is_success_status(response.status) {
        return Outcome::success(parsed);
    }
    Outcome::failure(
        format!(
            "Can't process response from server. Status Code: {} Data from server: {}",
            response.status,
            escape_braces(&response.body)
        ),
        parsed,
    )
}

fn server_error(status: u16, detail: &str) -> String {
    format!("Error from server. Status Code: {status} Data from server: {detail}")
}

/// Percent-decode `text`, treating `+` as a space. Invalid UTF-8 sequences
/// are replaced rather than rejected.
fn unquote_plus(text: &str) -> String {
    let spaced = text.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&decoded).into_owned()
}
