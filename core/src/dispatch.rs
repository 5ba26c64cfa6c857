//! The single request path every action goes through.
//!
//! # Design
//! `Dispatcher::build_request` resolves credentials and the target URL into
//! a plain `HttpRequest`; `Dispatcher::dispatch` sends it through the
//! `Transport`, classifies the response and assembles the `ActionResult`.
//! Transport failures end the call before any response data is recorded.

use base64::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};

use crate::action::{ActionKind, ActionResult, ResponseData, Summary};
use crate::classify::{classify, is_json_type, ParsedBody};
use crate::config::{Auth, Settings};
use crate::http::{HttpMethod, HttpRequest};
use crate::normalize::ErrorDetail;
use crate::transport::Transport;

/// One call as requested by an action, before credentials are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: HttpMethod,
    /// Appended verbatim to the base URL.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub verify_certificate: bool,
}

impl Call {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Call {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            verify_certificate: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    settings: Settings,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(settings: Settings, transport: T) -> Self {
        Dispatcher {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply credentials and resolve the URL by plain concatenation.
    ///
    /// A token header the caller already set is left untouched. Basic auth
    /// replaces any caller-supplied `Authorization` header.
    pub fn build_request(&self, call: &Call) -> HttpRequest {
        let mut headers = call.headers.clone();
        match &self.settings.auth {
            Auth::Token { header, value } => {
                if !headers.iter().any(|(name, _)| name.eq_ignore_ascii_case(header)) {
                    headers.push((header.clone(), value.clone()));
                }
            }
            Auth::Basic { username, password } => {
                headers.retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
                let credentials = BASE64_STANDARD.encode(format!("{username}:{password}"));
                headers.push(("Authorization".to_string(), format!("Basic {credentials}")));
            }
            Auth::None => {}
        }

        HttpRequest {
            method: call.method,
            url: format!("{}{}", self.settings.base_url, call.path),
            headers,
            body: call.body.clone(),
            verify_certificate: call.verify_certificate,
            timeout: self.settings.timeout,
        }
    }

    pub fn dispatch(&self, action: ActionKind, call: &Call) -> ActionResult {
        let request = self.build_request(call);
        debug!(%action, method = %request.method, url = %request.url, "sending request");

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %request.url, error = %err, "request failed");
                return ActionResult::failure(format!(
                    "Error Connecting to server. Details: {}",
                    ErrorDetail::from(&err)
                ));
            }
        };
        debug!(status = response.status, "received response");

        // HEAD responses carry no body worth classifying.
        if action == ActionKind::Http(HttpMethod::Head) && response.status == 200 {
            return ActionResult::success();
        }

        let outcome = classify(&response);
        let response_body = if is_json_type(response.content_type()) {
            outcome
                .parsed
                .as_ref()
                .map(ParsedBody::to_value)
                .unwrap_or(Value::Null)
        } else {
            Value::String(response.body.clone())
        };

        let mut result = ActionResult::success();
        result.data.push(ResponseData {
            method: request.method.as_str().to_string(),
            location: request.url,
            parsed_response_body: outcome.parsed,
            response_body,
            response_headers: response.header_map(),
        });
        result.summary = Summary {
            status_code: Some(response.status),
            reason: Some(response.reason),
        };

        if action == ActionKind::TestConnectivity {
            result.progress(format!("Got status code {}", response.status));
        }

        if !outcome.success {
            let message = outcome.message.unwrap_or_default();
            warn!(status = response.status, %message, "response classified as failure");
            result.set_failed(message);
        }
        result
    }
}
