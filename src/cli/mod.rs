//! Command-line interface for viva.
//!
//! Provides commands for running an interview session, probing the
//! generation gateway, and inspecting resolved configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::capture::NoDictation;
use crate::config;
use crate::domain::{Difficulty, ExperienceLevel, InputMode, SessionConfig};
use crate::export::{ConsoleRenderer, JsonExporter, ResultConsumer};
use crate::gateway::{Gateway, HttpGateway};
use crate::session::{SessionRunner, UserInput};

/// viva - adaptive interview session engine
#[derive(Parser, Debug)]
#[command(name = "viva")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interview session
    Run {
        /// Session config YAML (flags below are ignored when set)
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// Candidate experience level
        #[arg(long, value_enum, default_value = "mid")]
        level: LevelArg,

        /// Interview types (comma-separated)
        #[arg(long, default_value = "technical")]
        types: String,

        /// Topics to focus on (comma-separated)
        #[arg(long)]
        topics: Option<String>,

        /// Question difficulty
        #[arg(long, value_enum, default_value = "auto")]
        difficulty: DifficultyArg,

        /// Number of questions
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Answer input mode
        #[arg(long, value_enum, default_value = "text")]
        mode: ModeArg,

        /// Resume/background excerpt threaded into question prompts
        #[arg(long)]
        resume: Option<String>,
    },

    /// Probe the generation gateway
    Check,

    /// Show resolved configuration (debug)
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LevelArg {
    Junior,
    Mid,
    Senior,
}

impl From<LevelArg> for ExperienceLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Junior => Self::Junior,
            LevelArg::Mid => Self::Mid,
            LevelArg::Senior => Self::Senior,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Auto,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
            DifficultyArg::Auto => Self::Auto,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Text,
    Voice,
}

impl From<ModeArg> for InputMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Text => Self::Text,
            ModeArg::Voice => Self::Voice,
        }
    }
}

impl Cli {
    /// Execute the parsed command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                session,
                level,
                types,
                topics,
                difficulty,
                count,
                mode,
                resume,
            } => {
                let session_config = match session {
                    Some(path) => config::load_session_config(&path)?,
                    None => SessionConfig {
                        experience_level: level.into(),
                        interview_types: split_list(&types),
                        topics: topics.as_deref().map(split_list).unwrap_or_default(),
                        difficulty: difficulty.into(),
                        question_count: count,
                        mode: mode.into(),
                        resume_context: resume,
                    },
                };
                execute_run(session_config).await
            }
            Commands::Check => execute_check().await,
            Commands::Config => execute_config(),
        }
    }
}

/// Split a comma-separated flag into trimmed, non-empty entries
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Map one line of terminal input to a session action
fn parse_input(line: &str) -> UserInput {
    match line.trim() {
        "" => UserInput::Submit,
        ":mic" => UserInput::ToggleCapture,
        ":retry" => UserInput::Retry,
        ":clear" => UserInput::ClearDraft,
        ":quit" | ":q" => UserInput::Quit,
        text => UserInput::Text(text.to_string()),
    }
}

/// Run an interactive session against the configured gateway
async fn execute_run(session_config: SessionConfig) -> Result<()> {
    let settings = config::config()?;
    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::from_settings(&settings.gateway)?);
    let consumers: Vec<Box<dyn ResultConsumer>> = vec![
        Box::new(ConsoleRenderer),
        Box::new(JsonExporter::new(settings.sessions_dir())),
    ];

    let (input_tx, input_rx) = mpsc::channel::<UserInput>(16);

    // Terminal reader; the channel closes on EOF, which the runner treats
    // as quitting.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if input_tx.send(parse_input(&line)).await.is_err() {
                break;
            }
        }
    });

    println!("viva: {} questions, answers commit on an empty line", session_config.question_count);
    println!("(:mic toggles voice capture, :clear drops the draft, :retry retries a failed request, :quit exits)");

    let runner = SessionRunner::new(
        Some(session_config),
        gateway,
        NoDictation,
        consumers,
        input_rx,
    )?;

    match runner.run().await? {
        Some(_outcome) => Ok(()),
        None => {
            println!("Session ended before completion.");
            Ok(())
        }
    }
}

/// Probe gateway reachability
async fn execute_check() -> Result<()> {
    let settings = config::config()?;
    let gateway = HttpGateway::from_settings(&settings.gateway)?;

    println!("Checking {} ...", settings.gateway.base_url);
    gateway
        .health_check()
        .await
        .context("Gateway health check failed")?;
    println!("Gateway: ok");
    Ok(())
}

/// Show the resolved configuration
fn execute_config() -> Result<()> {
    let settings = config::config()?;

    println!();
    println!("viva configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!("Home:         {}", settings.home.display());
    println!("Sessions:     {}", settings.sessions_dir().display());
    println!("Gateway URL:  {}", settings.gateway.base_url);
    println!("Model:        {}", settings.gateway.model);
    println!("Timeout:      {}s", settings.gateway.timeout_secs);
    match &settings.config_file {
        Some(path) => println!("Config file:  {}", path.display()),
        None => println!("Config file:  (none found)"),
    }
    println!();
    Ok(())
}
