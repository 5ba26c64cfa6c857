//! Action identifiers, parameters and the result record.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::classify::ParsedBody;
use crate::http::HttpMethod;

/// The actions a connector answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    TestConnectivity,
    Http(HttpMethod),
}

impl ActionKind {
    pub fn identifier(&self) -> &'static str {
        match self {
            ActionKind::TestConnectivity => "test_connectivity",
            ActionKind::Http(HttpMethod::Get) => "http_get",
            ActionKind::Http(HttpMethod::Post) => "http_post",
            ActionKind::Http(HttpMethod::Put) => "http_put",
            ActionKind::Http(HttpMethod::Patch) => "http_patch",
            ActionKind::Http(HttpMethod::Delete) => "http_delete",
            ActionKind::Http(HttpMethod::Head) => "http_head",
            ActionKind::Http(HttpMethod::Options) => "http_options",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        std::iter::once(ActionKind::TestConnectivity)
            .chain(HttpMethod::ALL.into_iter().map(ActionKind::Http))
            .find(|kind| kind.identifier() == s)
            .ok_or_else(|| format!("Unsupported action: {s}"))
    }
}

/// Parameters of a verb action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParams {
    /// Path relative to the base URL.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Header mapping as JSON object text.
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default)]
    pub verify_certificate: bool,
}

impl ActionParams {
    pub fn at(location: impl Into<String>) -> Self {
        ActionParams {
            location: Some(location.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failed,
}

/// Request and response details recorded for one completed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseData {
    pub method: String,
    pub location: String,
    pub parsed_response_body: Option<ParsedBody>,
    /// Raw body text, or the parsed value for JSON content types.
    pub response_body: Value,
    pub response_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Everything an action reports back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Vec<ResponseData>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub progress: Vec<String>,
}

impl ActionResult {
    pub fn success() -> Self {
        ActionResult {
            status: ActionStatus::Success,
            message: None,
            data: Vec::new(),
            summary: Summary::default(),
            progress: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ActionResult {
            status: ActionStatus::Failed,
            message: Some(message.into()),
            ..ActionResult::success()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }

    pub fn set_failed(&mut self, message: impl Into<String>) {
        self.status = ActionStatus::Failed;
        self.message = Some(message.into());
    }

    /// Record a progress line and log it.
    pub fn progress(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{line}");
        self.progress.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifiers_round_trip() {
        for kind in std::iter::once(ActionKind::TestConnectivity)
            .chain(HttpMethod::ALL.into_iter().map(ActionKind::Http))
        {
            assert_eq!(kind.identifier().parse::<ActionKind>().unwrap(), kind);
        }
        assert_eq!(
            "http_trace".parse::<ActionKind>().unwrap_err(),
            "Unsupported action: http_trace"
        );
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: ActionParams = serde_json::from_value(json!({"location": "/items"})).unwrap();
        assert_eq!(params, ActionParams::at("/items"));
        assert!(!params.verify_certificate);
    }

    #[test]
    fn failure_serializes_message_and_empty_summary() {
        let value = serde_json::to_value(ActionResult::failure("boom")).unwrap();
        assert_eq!(
            value,
            json!({"status": "failed", "message": "boom", "data": [], "summary": {}})
        );
    }
}
