//! The connector facade: configuration checks, action routing and the
//! per-verb operations.
//!
//! # Design
//! A `Connector` is built once per session from a validated configuration
//! and never changes afterwards, so it can be shared freely between
//! concurrent invocations. Every verb goes through `Connector::verb`, which
//! validates the action parameters locally and only then hands a `Call` to
//! the `Dispatcher`. The session state blob is carried through untouched.

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::action::{ActionKind, ActionParams, ActionResult};
use crate::config::{ensure_leading_slash, ConnectorConfig, Settings};
use crate::dispatch::{Call, Dispatcher};
use crate::error::ConfigError;
use crate::http::HttpMethod;
use crate::normalize::normalize;
use crate::transport::{Transport, UreqTransport};

#[derive(Debug)]
pub struct Connector<T = UreqTransport> {
    dispatcher: Dispatcher<T>,
    state: Value,
}

impl Connector {
    /// Validate `config` and build a connector that talks over the network.
    pub fn initialize(config: &ConnectorConfig, state: Value) -> Result<Self, ConfigError> {
        Self::with_transport(config, state, UreqTransport)
    }
}

impl<T: Transport> Connector<T> {
    pub fn with_transport(
        config: &ConnectorConfig,
        state: Value,
        transport: T,
    ) -> Result<Self, ConfigError> {
        let settings = config.validate().inspect_err(|err| {
            warn!(base_url = %config.base_url, error = %err, "invalid connector configuration");
        })?;
        info!(base_url = %settings.base_url, "connector initialized");
        Ok(Connector {
            dispatcher: Dispatcher::new(settings, transport),
            state,
        })
    }

    pub fn settings(&self) -> &Settings {
        self.dispatcher.settings()
    }

    /// Session state exactly as it was passed to `initialize`.
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// End the session, handing the state back for persistence.
    pub fn finalize(self) -> Value {
        self.state
    }

    /// Run the action named by `action_id`, e.g. `"http_get"`.
    pub fn handle_action(&self, action_id: &str, params: &ActionParams) -> ActionResult {
        match action_id.parse::<ActionKind>() {
            Ok(action) => self.run(action, params),
            Err(message) => {
                warn!(action_id, "unsupported action");
                ActionResult::failure(message)
            }
        }
    }

    pub fn run(&self, action: ActionKind, params: &ActionParams) -> ActionResult {
        match action {
            ActionKind::TestConnectivity => self.test_connectivity(),
            ActionKind::Http(method) => self.verb(method, params),
        }
    }

    /// Query the configured test path, or the base URL itself.
    pub fn test_connectivity(&self) -> ActionResult {
        let action = ActionKind::TestConnectivity;
        let settings = self.settings();
        let path = settings.test_path.clone().unwrap_or_default();

        let mut lead = ActionResult::success();
        lead.progress(format!("In action handler for: {action}"));
        lead.progress(format!(
            "Querying base url, {}{}, to test credentials",
            settings.base_url, path
        ));

        let mut result = self.dispatcher.dispatch(action, &Call::new(HttpMethod::Get, path));
        prepend_progress(&mut result, lead);
        if result.is_success() {
            result.progress("Test Connectivity Passed");
        } else {
            result.progress("Test Connectivity Failed");
        }
        result
    }

    pub fn get(&self, params: &ActionParams) -> ActionResult {
        self.verb(HttpMethod::Get, params)
    }

    pub fn post(&self, params: &ActionParams) -> ActionResult {
        self.verb(HttpMethod::Post, params)
    }

    pub fn put(&self, params: &ActionParams) -> ActionResult {
        self.verb(HttpMethod::Put, params)
    }

    pub fn patch(&self, params: &ActionParams) -> ActionResult {
        self.verb(HttpMethod::Patch, params)
    }

    pub fn delete(&self, params: &ActionParams) -> ActionResult {
        self.verb(HttpMethod::Delete, params)
    }

    pub fn head(&self, params: &ActionParams) -> ActionResult {
        self.verb(HttpMethod::Head, params)
    }

    pub fn options(&self, params: &ActionParams) -> ActionResult {
        self.verb(HttpMethod::Options, params)
    }

    /// Shared body of every verb action. Parameter problems are reported
    /// before any request is sent.
    pub fn verb(&self, method: HttpMethod, params: &ActionParams) -> ActionResult {
        let action = ActionKind::Http(method);
        let mut lead = ActionResult::success();
        lead.progress(format!("In action handler for: {action}"));

        let mut result = match build_call(method, params) {
            Ok(call) => self.dispatcher.dispatch(action, &call),
            Err(message) => {
                warn!(%action, %message, "rejected action parameters");
                ActionResult::failure(message)
            }
        };
        prepend_progress(&mut result, lead);
        result
    }
}

fn prepend_progress(result: &mut ActionResult, mut lead: ActionResult) {
    lead.progress.append(&mut result.progress);
    result.progress = lead.progress;
}

fn build_call(method: HttpMethod, params: &ActionParams) -> Result<Call, String> {
    let location = params
        .location
        .as_deref()
        .ok_or_else(|| "Missing required parameter: location".to_string())?;
    let headers = match params.headers.as_deref() {
        Some(text) if !text.trim().is_empty() => parse_headers(text)?,
        _ => Vec::new(),
    };

    Ok(Call {
        method,
        path: ensure_leading_slash(location),
        headers,
        body: params.body.clone(),
        verify_certificate: params.verify_certificate,
    })
}

/// Parse a JSON object of header names to values. Non-string values are
/// sent as their JSON text.
pub fn parse_headers(text: &str) -> Result<Vec<(String, String)>, String> {
    let object: Map<String, Value> = serde_json::from_str(text).map_err(|err| {
        format!(
            "Failed to parse headers as JSON object. error: {}, headers: {}",
            normalize(&err),
            text
        )
    })?;

    Ok(object
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(value) => (name, value),
            other => (name, other.to_string()),
        })
        .collect())
}
