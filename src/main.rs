//! Sayso - offline voice command dispatcher
//!
//! Main entry point: loads configuration, wires the assistant and runs it.

use anyhow::{Context, Result};
use clap::Parser;
use sayso::integration::{install_interrupt_handler, AssistantBuilder, AssistantConfig, ConfigError};
use sayso::speech::{Responder, SpeechResponder};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sayso")]
#[command(about = "Offline voice assistant: time, date, weather, email, reminders and custom commands")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to <config dir>/sayso/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read commands from the keyboard only; no recognition model needed
    #[arg(long)]
    text_only: bool,

    /// Speak responses aloud
    #[arg(long)]
    speak: bool,

    /// JSON file holding custom commands
    #[arg(long)]
    commands_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sayso=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting sayso");

    let config = load_config(&cli)?;

    if let Err(e) = config.validate() {
        if let ConfigError::MissingModel(message) = &e {
            SpeechResponder::console().say(message);
            std::process::exit(1);
        }
        return Err(e).context("Invalid configuration");
    }

    let mut assistant = match AssistantBuilder::new(config).build() {
        Ok(assistant) => assistant,
        Err(e) => {
            SpeechResponder::console().say(&e.user_message());
            return Err(e).context("Failed to start the assistant");
        }
    };
    install_interrupt_handler(assistant.responder())?;

    assistant.run()?;
    info!("sayso stopped");
    Ok(())
}

/// File, then environment, then command line
fn load_config(cli: &Cli) -> Result<AssistantConfig> {
    let mut config = match cli.config.clone().or_else(AssistantConfig::default_path) {
        Some(path) => {
            info!("Loading config from {}", path.display());
            AssistantConfig::load(&path)?
        }
        None => AssistantConfig::default(),
    };
    config.apply_env();

    if let Some(file) = &cli.commands_file {
        config.commands.file = file.clone();
    }
    if cli.speak {
        config = config.with_speech_output();
    }
    if cli.text_only {
        config = config.without_voice_input();
    }

    if cfg!(not(feature = "voice")) && config.recognizer.enabled {
        warn!("Built without the `voice` feature, reading commands from the keyboard");
        config = config.without_voice_input();
    }
    if cfg!(not(feature = "speech-out")) && config.speech.enabled {
        warn!("Built without the `speech-out` feature, responses will only be printed");
        config.speech.enabled = false;
    }

    Ok(config)
}
