//! DebateSim CLI - Two-Persona Debate Simulator
//!
//! Generates a debate subject, lets two AI personas argue it turn by turn,
//! and shows the transcript in the console or a full-screen terminal window.

mod render;

use clap::Parser;
use colored::Colorize;
use debatesim_core::subject::{self, TopicProposal};
use debatesim_core::{
    CompletionBackend, Config, DebateError, DebateSimulator, KeysLoader, OpenAiCompletionClient,
    ProcessEnv, SimulationCallback, SimulationEvent,
};
use render::Renderer;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "debatesim",
    version,
    about = "Debate Simulator - Watch two AI personas debate",
    long_about = "Runs a turn-by-turn debate between two AI personas using an OpenAI-compatible API."
)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(long, default_value = "config.toml", value_name = "PATH")]
    config: PathBuf,

    /// Credentials file holding provider API keys
    #[arg(long, default_value = "keys.toml", value_name = "PATH")]
    keys: PathBuf,

    /// Print the transcript as plain text instead of opening a window
    #[arg(long)]
    plain: bool,

    /// Number of debate rounds (overrides the config file)
    #[arg(short, long, value_name = "ROUNDS")]
    rounds: Option<usize>,

    /// Debate this topic instead of generating one
    #[arg(long, value_name = "TOPIC")]
    topic: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = Config::load(&cli.config).unwrap_or_else(|e| fatal(e));
    let applied = KeysLoader::new(&cli.keys)
        .load_into(&mut ProcessEnv)
        .unwrap_or_else(|e| fatal(e));
    info!(model = %config.model, keys = ?applied, "configuration loaded");

    // Get API configuration from config, then environment
    let api_base = config
        .api_base
        .clone()
        .or_else(|| env::var("OPENAI_API_BASE").ok())
        .or_else(|| env::var("OPENAI_BASE_URL").ok())
        .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!(
            "{}",
            "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
        );
        String::new()
    });

    let rounds = cli.rounds.unwrap_or(config.rounds).max(1);
    if cli.rounds == Some(0) {
        eprintln!(
            "{}",
            "Warning: Rounds increased to minimum of 1 (was 0).".yellow()
        );
    }

    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiCompletionClient::new(
        api_base,
        api_key,
        Some(config.model.clone()),
    )?);
    let mut renderer = render::renderer_for(cli.plain, config.personas.clone());

    // Every completion call is awaited in turn on this single thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let subject = match cli.topic {
        Some(topic) => topic,
        None => choose_subject(&runtime, backend.as_ref(), &config, renderer.as_mut())?,
    };

    print_header(&config, &subject, rounds);

    let mut simulator =
        DebateSimulator::from_config(backend, &config).with_callback(create_console_callback());
    let transcript = runtime.block_on(simulator.simulate(&subject, rounds));

    renderer.render(&transcript.to_text(), &config.subject.title)?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Report a configuration problem and exit.
fn fatal(error: DebateError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    std::process::exit(1);
}

/// Generate candidate topics and let the user pick one.
fn choose_subject(
    runtime: &Runtime,
    backend: &dyn CompletionBackend,
    config: &Config,
    renderer: &mut dyn Renderer,
) -> Result<String, render::RenderError> {
    eprintln!("{}", "Generating debate topics...".dimmed());
    let generate = subject::propose_topics(backend, &config.subject, config.temperature);
    let proposal = runtime.block_on(generate);

    let topics = match proposal {
        TopicProposal::Generated(topics) => topics,
        TopicProposal::Fallback(fallback) => return Ok(fallback),
    };

    let selection = renderer.select(&topics, &config.subject.selection_prompt)?;
    if selection.is_none() {
        info!("topic selection cancelled, using the first topic");
        eprintln!(
            "{}",
            "Topic selection cancelled. Starting with the first topic.".yellow()
        );
    }

    Ok(subject::resolve_selection(&topics, selection)
        .unwrap_or_else(|| config.subject.fallback.clone()))
}

fn print_header(config: &Config, subject: &str, rounds: usize) {
    let personas = &config.personas;
    eprintln!();
    eprintln!("{}", "═".repeat(70).bright_blue());
    let title = format!("  DebateSim - {} vs {}", personas.a.label, personas.b.label);
    eprintln!("{}", title.bright_blue().bold());
    eprintln!("{}", "═".repeat(70).bright_blue());
    eprintln!("{} {}", "Topic:".bold(), subject.bright_white());
    eprintln!(
        "{} {} rounds using {}",
        "Format:".bold(),
        rounds,
        config.model.dimmed()
    );
    eprintln!("{}", "─".repeat(70).dimmed());
}

/// Create a callback that reports simulation progress on stderr.
fn create_console_callback() -> SimulationCallback {
    Box::new(move |event| match event {
        SimulationEvent::TurnStarted { round, label, .. } => {
            eprintln!(
                "{} {} {}",
                "▶".bright_cyan(),
                label.bright_cyan().bold(),
                format!("(round {})", round + 1).yellow()
            );
        }
        SimulationEvent::TurnCompleted { content, .. } => {
            let size = format!("{} characters", content.chars().count());
            eprintln!("  {}", size.dimmed());
        }
        SimulationEvent::TurnFailed { label, error, .. } => {
            eprintln!("  {} {}: {}", "✖".red().bold(), label, error.red());
        }
        SimulationEvent::DebateEnded { turns, ended_early } => {
            let summary = format!("  Debate concluded after {} turns.", turns);
            if ended_early {
                eprintln!("{}", format!("{} (stopped early)", summary).yellow().bold());
            } else {
                eprintln!("{}", summary.bright_green().bold());
            }
        }
    })
}
