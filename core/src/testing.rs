//! Scripted transport for unit tests.

use std::sync::Mutex;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

enum Reply {
    Respond(HttpResponse),
    Fail(fn() -> TransportError),
}

/// Answers every request with the same reply and records what it was sent.
pub(crate) struct FakeTransport {
    reply: Reply,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn respond(response: HttpResponse) -> Self {
        FakeTransport {
            reply: Reply::Respond(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn fail(error: fn() -> TransportError) -> Self {
        FakeTransport {
            reply: Reply::Fail(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for FakeTransport {
    fn default() -> Self {
        FakeTransport::respond(response(200, None, ""))
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(error) => Err(error()),
        }
    }
}

pub(crate) fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
    let reason = match status {
        200 => "OK",
        204 => "No Content",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    };
    HttpResponse {
        status,
        reason: reason.to_string(),
        headers: content_type
            .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
            .unwrap_or_default(),
        body: body.to_string(),
    }
}
