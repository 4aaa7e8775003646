mod aggregate;
mod config;
mod engine;
mod errors;
mod evaluators;
mod extract;
mod models;
mod reference;
mod report;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;
use crate::engine::{AnalysisInput, Engine};
use crate::errors::EngineError;
use crate::models::resume::ResumeDocument;
use crate::models::target::JobTarget;
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "rescore", version, about = "Resume completeness and ATS-risk scoring engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a resume file and print the JSON report to stdout.
    Score {
        /// Resume to score: .json for a structured document, anything else
        /// is treated as raw extracted text.
        #[arg(long)]
        resume: PathBuf,
        /// Optional job target as a JSON file.
        #[arg(long)]
        target: Option<PathBuf>,
        /// Analysis date (YYYY-MM-DD); defaults to today. Pin it for
        /// reproducible output.
        #[arg(long)]
        now: Option<NaiveDate>,
        /// Pretty-print the report.
        #[arg(long)]
        pretty: bool,
    },
    /// Run the HTTP scoring service.
    Serve {
        /// Port to listen on; overrides PORT and the config file.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return exit_code(&e);
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match cli.command {
        Command::Score {
            resume,
            target,
            now,
            pretty,
        } => run_score(config, &resume, target.as_deref(), now, pretty),
        Command::Serve { port } => run_serve(config, port).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            exit_code(&e)
        }
    }
}

fn exit_code(e: &EngineError) -> ExitCode {
    ExitCode::from(e.exit_code() as u8)
}

fn run_score(
    config: EngineConfig,
    resume: &Path,
    target: Option<&Path>,
    now: Option<NaiveDate>,
    pretty: bool,
) -> Result<(), EngineError> {
    let engine = Engine::new(config)?;

    let contents = read_input_file(resume)?;
    let (raw_text, document) = if resume.extension().is_some_and(|e| e == "json") {
        let document: ResumeDocument = serde_json::from_str(&contents).map_err(|e| {
            EngineError::InvalidInput(format!("malformed resume document: {e}"))
        })?;
        (None, Some(document))
    } else {
        (Some(contents), None)
    };

    let target = target
        .map(|path| {
            let raw = read_input_file(path)?;
            serde_json::from_str::<JobTarget>(&raw)
                .map_err(|e| EngineError::InvalidInput(format!("malformed job target: {e}")))
        })
        .transpose()?;

    let input = AnalysisInput {
        raw_text,
        document,
        target,
        now: now.unwrap_or_else(|| Utc::now().date_naive()),
    };
    let report = engine.analyze_report(&input)?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(anyhow::Error::from)?;
    println!("{json}");
    Ok(())
}

fn read_input_file(path: &Path) -> Result<String, EngineError> {
    if !path.exists() {
        return Err(EngineError::NotFound(format!(
            "no such file: {}",
            path.display()
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| EngineError::InvalidInput(format!("cannot read {}: {e}", path.display())))
}

async fn run_serve(config: EngineConfig, port: Option<u16>) -> Result<(), EngineError> {
    let port = port.unwrap_or(config.port);
    info!("Starting rescore engine v{}", env!("CARGO_PKG_VERSION"));

    let engine = Arc::new(Engine::new(config)?);
    let state = AppState { engine };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}")
        .parse()
        .map_err(|e| EngineError::Config(format!("invalid listen address: {e}")))?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;

    Ok(())
}
