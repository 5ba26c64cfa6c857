//! HTTP transport types shared by the dispatcher, the transport and the
//! response classifier.
//!
//! # Design
//! Requests and responses are plain data. The dispatcher builds an
//! `HttpRequest`, a `Transport` executes it, and the classifier consumes the
//! resulting `HttpResponse` without touching the network. Owned `String` and
//! `Vec` fields keep the values easy to construct in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Uppercase wire name, e.g. `"PATCH"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound HTTP request described as plain data.
///
/// `url` is already fully resolved; `timeout` of `None` leaves the
/// transport's default in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub verify_certificate: bool,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The declared `Content-Type`, or `""` when the server sent none.
    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }

    /// Headers as a mapping keyed by the name as first received. Names that
    /// differ only in case are merged and their values joined with `", "`.
    pub fn header_map(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &self.headers {
            let key = map
                .keys()
                .find(|key| key.eq_ignore_ascii_case(name))
                .cloned()
                .unwrap_or_else(|| name.clone());
            map.entry(key)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        map
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse {
            status: 200,
            reason: "OK".to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: String::new(),
        }
    }

    #[test]
    fn content_type_lookup_ignores_case() {
        let resp = response(&[("Content-Type", "application/json")]);
        assert_eq!(resp.content_type(), "application/json");
        assert_eq!(response(&[]).content_type(), "");
    }

    #[test]
    fn header_map_joins_repeated_names() {
        let resp = response(&[("Set-Cookie", "a=1"), ("set-cookie", "b=2"), ("X-Id", "7")]);
        let map = resp.header_map();
        assert_eq!(map["Set-Cookie"], "a=1, b=2");
        assert_eq!(map["X-Id"], "7");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn header_map_keeps_received_casing() {
        let resp = response(&[("Content-Type", "text/plain"), ("x-trace", "abc")]);
        let map = resp.header_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["Content-Type", "x-trace"]);
        assert_eq!(resp.header("content-type"), Some("text/plain"));
    }
}
