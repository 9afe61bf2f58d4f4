//! conform - run a conformance script against a JSON-RPC endpoint
//!
//! Usage: `conform <SCRIPT> <OUTPUT> [OPTIONS]`

#![allow(missing_docs)]

use clap::Parser;
use rpc_conform::config::ConformConfig;
use rpc_conform::rpc::HttpRpcClient;
use rpc_conform::utils::logging::init_tracing;
use rpc_conform::{Result, RunSummary, ScriptRunner};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "conform", version, about = "Run a conformance script against a JSON-RPC endpoint")]
struct Cli {
    /// Test script to execute
    script: PathBuf,

    /// File receiving one result record per call
    output: PathBuf,

    /// Endpoint URL
    #[arg(long)]
    url: Option<String>,

    /// YAML configuration file
    #[arg(long, env = "CONFORM_CONFIG")]
    config: Option<PathBuf>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Skip fetching the service IDL
    #[arg(long)]
    no_contract: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn apply(&self, mut config: ConformConfig) -> Result<ConformConfig> {
        if let Some(url) = &self.url {
            config.endpoint.url = url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.endpoint.timeout_ms = timeout_ms;
        }
        if self.no_contract {
            config.endpoint.load_contract = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.log_json {
            config.logging.json = true;
        }
        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let config = cli.apply(ConformConfig::load(cli.config.as_deref()).await?)?;
    init_tracing(&config.logging)?;
    config.log_summary(cli.config.as_deref());

    let client = HttpRpcClient::connect(&config.endpoint).await?;

    info!(script = ?cli.script, output = ?cli.output, "Running script");
    let input = BufReader::new(File::open(&cli.script)?);
    let output = BufWriter::new(File::create(&cli.output)?);

    ScriptRunner::new(&client).run(input, output).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) if summary.err > 0 => {
            eprintln!("{} of {} calls failed unexpectedly", summary.err, summary.calls);
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // Display keeps the script line number readable
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
