//! Alsvid command-line interface.
//!
//! Each subcommand reads one request (JSON or YAML) from a file or stdin,
//! runs it through the engine and prints the response as JSON on stdout.
//! Logs go to stderr unless a log file is configured.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::io::Read;
use std::path::{Path, PathBuf};

use alsvid_combine::CombineStatus;
use alsvid_engine::request::{
    CombineRequest, DivideRequest, MitigateRequest, PostprocessRequest, PreprocessRequest,
};
use alsvid_engine::{Engine, EngineConfig, EngineError, TracingConfig, init_tracing};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Alsvid - circuit batching, observable estimation and readout mitigation
#[derive(Parser)]
#[command(name = "alsvid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "ALSVID_CONFIG")]
    config: Option<PathBuf>,

    /// Log format (console, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine circuits into one batched circuit
    Combine {
        /// Request file (JSON or YAML); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Build measurement circuits for an observable
    EstimatePre {
        /// Request file (JSON or YAML); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Turn per-group counts into an expectation value
    EstimatePost {
        /// Request file (JSON or YAML); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Correct counts for readout error
    Mitigate {
        /// Request file (JSON or YAML); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Split counts of a combined circuit per sub-circuit
    Divide {
        /// Request file (JSON or YAML); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let result = execute(cli).await;

    // Handle errors
    if let Err(e) = result {
        if let Some(engine_error) = e.downcast_ref::<EngineError>() {
            if let Ok(body) = serde_json::to_string_pretty(&engine_error.body()) {
                println!("{body}");
            }
        }
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn execute(cli: Cli) -> Result<()> {
    let mut config = EngineConfig::load(cli.config.as_deref())?;

    // Setup logging
    match cli.verbose {
        0 => {}
        1 => config.logging.level = "info".to_string(),
        2 => config.logging.level = "debug".to_string(),
        _ => config.logging.level = "trace".to_string(),
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate()?;
    init_tracing(TracingConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let engine = Engine::new(config)?;

    match cli.command {
        Commands::Combine { input } => {
            let req: CombineRequest = read_request(input.as_deref())?;
            let outcome = engine.combine(req.programs, req.max_qubits).await;
            print_json(&outcome)?;
            if outcome.status != CombineStatus::Success {
                anyhow::bail!("Combine finished with status {:?}", outcome.status);
            }
        }

        Commands::EstimatePre { input } => {
            let req: PreprocessRequest = read_request(input.as_deref())?;
            let output = engine
                .estimation_preprocess(req.program, req.operator, req.basis_gates, req.qubit_layout)
                .await?;
            print_json(&output)?;
        }

        Commands::EstimatePost { input } => {
            let req: PostprocessRequest = read_request(input.as_deref())?;
            let output = engine
                .estimation_postprocess(req.grouped_counts, req.grouped_operators)
                .await?;
            print_json(&output)?;
        }

        Commands::Mitigate { input } => {
            let req: MitigateRequest = read_request(input.as_deref())?;
            let counts = engine
                .mitigate(req.device_topology, req.counts, req.program)
                .await?;
            print_json(&counts)?;
        }

        Commands::Divide { input } => {
            let req: DivideRequest = read_request(input.as_deref())?;
            let divided = engine.divide(req.counts, req.qubit_counts).await?;
            print_json(&divided)?;
        }
    }

    Ok(())
}

/// Read a request from `path`, or stdin when `None`.
///
/// `.json` files are read as JSON; anything else goes through the YAML
/// reader, which also accepts JSON.
fn read_request<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let (source, is_json) = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            (source, ext.eq_ignore_ascii_case("json"))
        }
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            (source, false)
        }
    };

    if is_json {
        serde_json::from_str(&source).context("Invalid JSON request")
    } else {
        serde_yaml_ng::from_str(&source).context("Invalid request")
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
