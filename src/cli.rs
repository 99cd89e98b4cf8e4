//! CLI interface for pocket-agent

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::backend::BackendClient;
use crate::config::{self, Config};
use crate::orchestrator::Orchestrator;
use crate::screening::{CallScreener, HeuristicReputation, SmsTriage};
use crate::telemetry::TracingExchangeSink;
use crate::types::{CallEvent, SmsEvent};
use crate::voice::{ChannelRecognizer, ConsoleSynthesizer, SilentCaptureSource, VoiceDeps};

#[derive(Parser)]
#[command(name = "pocket-agent")]
#[command(about = "Personal device assistant: voice turns, call screening, SMS triage", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the orchestrator with console collaborators
    ///
    /// Lines typed on stdin become final transcripts; /call and /sms
    /// inject screening events; /pause, /resume, /stop, /status control
    /// the voice machine; /quit exits.
    Run,
    /// Screen a caller identifier and print the decision
    Screen {
        /// Caller identifier; omit to simulate a withheld number
        identifier: Option<String>,
    },
    /// Triage an incoming message and print the action
    Sms {
        /// Sender identifier
        sender: String,
        /// Message body
        body: Vec<String>,
    },
    /// Configure the agent
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the wake phrase
        #[arg(long)]
        set_wake_phrase: Option<String>,
        /// Set the backend base URL
        #[arg(long)]
        set_backend_url: Option<String>,
        /// Add a term to the call blocklist
        #[arg(long)]
        add_blocked_term: Option<String>,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
    /// Check connectivity to the conversation backend
    Doctor,
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_console().await,
        Commands::Screen { identifier } => screen_once(identifier).await,
        Commands::Sms { sender, body } => sms_once(sender, body.join(" ")).await,
        Commands::Config { show, set_wake_phrase, set_backend_url, add_blocked_term, reset } => {
            if reset {
                config::reset_config()?;
            }
            if let Some(phrase) = set_wake_phrase {
                config::set_wake_phrase(&phrase)?;
            }
            if let Some(url) = set_backend_url {
                config::set_backend_url(&url)?;
            }
            if let Some(term) = add_blocked_term {
                config::add_blocked_term(&term)?;
            }
            if show {
                config::show_config()?;
            }
            Ok(())
        }
        Commands::Doctor => doctor().await,
    }
}

async fn run_console() -> Result<()> {
    let config = Config::load()?;
    let backend = Arc::new(BackendClient::new(&config.backend)?);
    let recognizer = ChannelRecognizer::new();

    let deps = VoiceDeps {
        recognizer: recognizer.clone(),
        synthesizer: ConsoleSynthesizer::new(),
        capture: SilentCaptureSource::new(),
        backend,
        sink: Arc::new(TracingExchangeSink),
    };

    let orchestrator = Orchestrator::new(&config, Arc::new(HeuristicReputation), deps);
    orchestrator.resume().await;

    println!("pocket-agent console (wake phrase: {:?})", config.voice.wake_phrase);
    println!("Type to speak; /call <id>, /sms <sender> <body>, /pause, /resume, /stop, /status, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('/') {
            let mut parts = rest.splitn(2, ' ');
            let command = parts.next().unwrap_or("");
            let args = parts.next().unwrap_or("").trim();

            match command {
                "quit" | "exit" => break,
                "pause" => orchestrator.pause().await,
                "resume" => orchestrator.resume().await,
                "stop" => orchestrator.stop_recording().await,
                "status" => {
                    let snapshot = orchestrator.status().borrow().clone();
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                }
                "call" => {
                    let caller = if args.is_empty() { None } else { Some(args.to_string()) };
                    let decision = orchestrator.screen_call(CallEvent::new(caller)).await;
                    println!("{}", serde_json::to_string_pretty(&decision)?);
                }
                "sms" => {
                    let mut parts = args.splitn(2, ' ');
                    let sender = parts.next().unwrap_or("").to_string();
                    let body = parts.next().unwrap_or("").to_string();
                    let action = orchestrator.triage_sms(SmsEvent::new(sender, body)).await;
                    println!("{}", serde_json::to_string_pretty(&action)?);
                }
                _ => println!("Unknown command: /{command}"),
            }
            continue;
        }

        recognizer.inject_final(line).await;
    }

    orchestrator.shutdown().await;
    Ok(())
}

async fn screen_once(identifier: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let screener = CallScreener::new(&config.screening, Arc::new(HeuristicReputation));

    let decision = screener.classify(&CallEvent::new(identifier)).await;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

async fn sms_once(sender: String, body: String) -> Result<()> {
    let config = Config::load()?;
    let backend = Arc::new(BackendClient::new(&config.backend)?);
    let triage = SmsTriage::new(&config.sms, config.backend.user_id, backend);

    let action = triage.triage(&SmsEvent::new(sender, body)).await;
    println!("{}", serde_json::to_string_pretty(&action)?);
    Ok(())
}

async fn doctor() -> Result<()> {
    let config = Config::load()?;
    let client = BackendClient::new(&config.backend)?;

    print!("Backend {} ... ", config.backend.base_url);
    match client.health().await {
        Ok(health) => {
            println!("ok ({}, {})", health.status, health.timestamp);
            Ok(())
        }
        Err(e) => {
            println!("unreachable");
            anyhow::bail!("Backend health check failed: {e}")
        }
    }
}
