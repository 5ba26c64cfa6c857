//! Executes plain-data requests on the wire.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. `UreqTransport` builds a
//! fresh blocking agent per request so the timeout and certificate
//! verification of each call apply to that call alone. Status codes are never
//! turned into errors here; interpreting them is the classifier's job.

use std::time::Duration;

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    fn agent(verify_certificate: bool, timeout: Option<Duration>) -> Agent {
        let mut config = Agent::config_builder().http_status_as_error(false);
        if let Some(timeout) = timeout {
            config = config.timeout_global(Some(timeout));
        }
        if !verify_certificate {
            config = config.tls_config(TlsConfig::builder().disable_verification(true).build());
        }
        config.build().new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = Self::agent(request.verify_certificate, request.timeout);
        let url = request.url.as_str();

        // Bodies are sent for every verb, as the caller asked for them.
        let mut builder = match request.method {
            HttpMethod::Get => agent.get(url).force_send_body(),
            HttpMethod::Head => agent.head(url).force_send_body(),
            HttpMethod::Delete => agent.delete(url).force_send_body(),
            HttpMethod::Options => agent.options(url).force_send_body(),
            HttpMethod::Post => agent.post(url),
            HttpMethod::Put => agent.put(url),
            HttpMethod::Patch => agent.patch(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = match &request.body {
            Some(body) => builder.send(body.as_bytes())?,
            None => builder.send_empty()?,
        };

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // Whatever the server sent is classified, however large.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
