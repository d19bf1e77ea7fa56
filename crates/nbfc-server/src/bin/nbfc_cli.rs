//! Command-line client for the NBFC assistant.
//!
//! ```bash
//! # Interactive chat against the configured database and model
//! nbfc-cli chat
//!
//! # Run audio/demo.mp3 through STT -> agent -> TTS
//! nbfc-cli voice-demo --session-id branch-7
//! ```

use clap::{Parser, Subcommand};
use nbfc_server::config::{self, ConfigError};
use nbfc_server::pipeline::{run_voice_demo, PipelineError};
use nbfc_server::{init_tracing, AppState, StartupError};
use std::io::Write;
use std::process::ExitCode;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(
    name = "nbfc-cli",
    version,
    about = "NBFC AI Assistant command-line client"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the TOML config file
    #[arg(long, global = true, env = "NBFC_CONFIG_PATH", default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the assistant until `exit` or `quit`
    Chat {
        /// Continue an existing session id
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Send the demo recording through the voice pipeline
    VoiceDemo {
        #[arg(long)]
        session_id: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("Demo function failed: {0}")]
    Demo(#[from] PipelineError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render result: {0}")]
    Render(#[from] serde_json::Error),
}

fn is_exit_command(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit")
}

async fn chat(state: AppState, mut session_id: Option<String>) -> Result<(), CliError> {
    println!("NBFC AI Assistant ready. Type 'exit' to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            break;
        }

        match state.assistant.process_message(input, session_id.clone()).await {
            Ok((reply, id)) => {
                session_id = Some(id);
                println!("\nAssistant: {}\n", reply);
            }
            Err(e) => eprintln!("\nError: {}\n", e),
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn voice_demo(state: AppState, session_id: Option<String>) -> Result<(), CliError> {
    let outcome = run_voice_demo(&state, session_id).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = config::load_config(Some(&cli.config))?;
    init_tracing(&config.logging);
    let state = AppState::from_config(&config).await?;

    match cli.command {
        Command::Chat { session_id } => chat(state, session_id).await,
        Command::VoiceDemo { session_id } => voice_demo(state, session_id).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
