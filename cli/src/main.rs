use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use serde_json::Value;

use http_connector_cli::{load_action_file, load_state, log_filter, run, save_state};

#[derive(Parser, Debug)]
#[command(name = "http-connector", version, about = "Run HTTP connector actions from a JSON file")]
struct Cli {
    #[arg(help = "Action file with identifier, config and parameters")]
    input_test_json: PathBuf,
    #[arg(long, help = "Session state file, created if missing")]
    state: Option<PathBuf>,
    #[arg(short, long, help = "Log request details")]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the JSON results.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let file = load_action_file(&cli.input_test_json)?;
    let state = match &cli.state {
        Some(path) => load_state(path)?,
        None => Value::Object(Default::default()),
    };

    let (results, state) = run(&file, state)?;

    if let Some(path) = &cli.state {
        save_state(path, &state)?;
    }
    println!("{}", serde_json::to_string_pretty(&results)?);

    if results.iter().all(|r| r.is_success()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
