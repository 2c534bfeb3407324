//! huginn: command-line front end for the gateway.
//!
//! Generates highlight descriptions, runs raw prompts, and embeds text
//! through a single [`Gateway`](huginn::Gateway) built from config.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use huginn::types::prompt::{description_prompt, extract_description};
use huginn::{Config, Gateway, Huginn, HuginnError, Secrets};

/// Huginn text-generation gateway
#[derive(Parser)]
#[command(name = "huginn")]
#[command(version)]
#[command(about = "Rate-limited, cached text generation with fallback descriptions")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print which path produced the text (cached, generated, fallback).
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Describe a highlight clip by title
    Describe {
        /// Clip title (or omit to read from stdin)
        title: Option<String>,
    },

    /// Run a raw prompt
    Prompt {
        /// Prompt text (or omit to read from stdin)
        text: Option<String>,
    },

    /// Embed text and print its dimensions
    Embed {
        /// Text to embed (or omit to read from stdin)
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;
    let gateway = build_gateway(&config, &secrets)?;

    info!(
        provider = gateway.provider_name(),
        max_requests = gateway.rate_limiter().max_requests(),
        "huginn starting"
    );

    match args.command {
        Command::Describe { title } => {
            let title = input_or_stdin(title)?;
            let generation = gateway
                .generate_detailed(&description_prompt(title.trim()))
                .await;
            if args.verbose {
                eprintln!("[{}]", generation.outcome);
            }
            println!("{}", extract_description(&generation.text));
        }
        Command::Prompt { text } => {
            let prompt = input_or_stdin(text)?;
            let generation = gateway.generate_detailed(&prompt).await;
            if args.verbose {
                eprintln!("[{}]", generation.outcome);
            }
            println!("{}", generation.text);
        }
        Command::Embed { text } => {
            let text = input_or_stdin(text)?;
            let embedding = gateway.embed(&text).await?;
            println!("model: {}", embedding.model);
            println!("dimensions: {}", embedding.dimensions);
        }
    }

    Ok(())
}

fn build_gateway(config: &Config, secrets: &Secrets) -> Result<Gateway, HuginnError> {
    let api_key = secrets.gemini_api_key().ok_or_else(|| {
        HuginnError::Configuration(format!(
            "No Gemini API key. Set {} or add [gemini] api_key to ~/.huginn/secrets.toml",
            huginn::config::API_KEY_ENV
        ))
    })?;

    Huginn::builder().config(config).gemini(api_key).build()
}

/// Use the argument when given, otherwise read all of stdin.
fn input_or_stdin(arg: Option<String>) -> io::Result<String> {
    if let Some(text) = arg {
        return Ok(text);
    }
    if io::stdin().is_terminal() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no input given and stdin is a terminal",
        ));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
