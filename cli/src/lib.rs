//! Test harness that runs connector actions described in a JSON file.
//!
//! # Design
//! An action file names one action, the connector configuration and a list
//! of parameter records. Each record becomes one action run; an empty list
//! runs the action once with default parameters (the usual shape for
//! `test_connectivity`). Session state lives in a separate JSON file that is
//! loaded before the run and written back, unchanged, afterwards.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use http_connector::{ActionParams, ActionResult, Connector, ConnectorConfig, Transport, UreqTransport};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize)]
pub struct ActionFile {
    pub identifier: String,
    pub config: ConnectorConfig,
    #[serde(default)]
    pub parameters: Vec<ActionParams>,
}

/// `RUST_LOG` when set, otherwise `debug` with `verbose` and `info` without.
pub fn log_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn load_action_file(path: &Path) -> Result<ActionFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read action file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse action file {}", path.display()))
}

/// Load session state; a missing file starts an empty session.
pub fn load_state(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "no saved state, starting empty");
        return Ok(Value::Object(Default::default()));
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse state file {}", path.display()))
}

pub fn save_state(path: &Path, state: &Value) -> Result<()> {
    let raw = serde_json::to_string_pretty(state)?;
    fs::write(path, raw).with_context(|| format!("failed to write state file {}", path.display()))
}

/// Run every parameter record of `file` over the network.
pub fn run(file: &ActionFile, state: Value) -> Result<(Vec<ActionResult>, Value)> {
    run_with(file, state, UreqTransport)
}

pub fn run_with<T: Transport>(
    file: &ActionFile,
    state: Value,
    transport: T,
) -> Result<(Vec<ActionResult>, Value)> {
    let connector = Connector::with_transport(&file.config, state, transport)
        .context("connector initialization failed")?;

    let defaults = [ActionParams::default()];
    let parameters = if file.parameters.is_empty() {
        &defaults[..]
    } else {
        &file.parameters[..]
    };

    let results: Vec<ActionResult> = parameters
        .iter()
        .map(|params| connector.handle_action(&file.identifier, params))
        .collect();
    let failed = results.iter().filter(|r| !r.is_success()).count();
    info!(action = %file.identifier, runs = results.len(), failed, "actions finished");

    Ok((results, connector.finalize()))
}
