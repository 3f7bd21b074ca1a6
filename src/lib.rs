pub mod api;
pub mod capture;
pub mod config;
pub mod connection;
pub mod dashboard;
pub mod models;
pub mod student;
pub mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::ClientConfig;
use models::{DEFAULT_SESSION_ID, DEFAULT_STUDENT_ID};
use student::commands::StudentOptions;

#[derive(Parser, Debug)]
#[command(name = "smartsession")]
#[command(about = "SmartSession classroom monitoring client")]
struct Cli {
    /// Backend base URL (overrides config file and SMARTSESSION_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// JSON config file with a `baseUrl` key
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture webcam frames and submit them for analysis
    Student {
        #[arg(long, default_value = DEFAULT_STUDENT_ID)]
        student_id: String,
        #[arg(long, default_value = DEFAULT_SESSION_ID)]
        session_id: String,
        /// Camera index passed to ffmpeg
        #[arg(short, long, default_value_t = 0)]
        device: usize,
        /// Use a generated test pattern instead of a camera
        #[arg(long)]
        synthetic: bool,
    },
    /// Poll and display per-student engagement
    Teacher,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    utils::init_logging(level);

    log::info!("SmartSession starting up...");

    let config = ClientConfig::resolve(cli.config.as_deref(), cli.base_url.as_deref())?;

    // Single-threaded, cooperative: every timer and request shares one scheduler.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Command::Student {
                student_id,
                session_id,
                device,
                synthetic,
            } => {
                let options = StudentOptions {
                    identity: models::StudentIdentity {
                        student_id,
                        session_id,
                    },
                    device_index: device,
                    synthetic,
                };
                student::commands::run_student(&config, options).await
            }
            Command::Teacher => dashboard::commands::run_teacher(&config).await,
        }
    })
}
