//! cognitex CLI — flashcard battles and the study companion in a terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use cognitex_core::model::{Locale, Mood};

mod commands;

#[derive(Parser)]
#[command(
    name = "cognitex",
    version,
    about = "Flashcard battles and an AI study companion"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that talks to a generative backend.
#[derive(Args, Clone)]
pub struct ServiceArgs {
    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provider name from the config (e.g. "openai", "ollama", "mock")
    #[arg(long)]
    provider: Option<String>,

    /// Model override
    #[arg(long)]
    model: Option<String>,

    /// Prompt and message language: en or vi
    #[arg(long)]
    locale: Option<Locale>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate flashcards for a subject and battle through them
    Quest {
        /// Subject or concept to study
        #[arg(long)]
        subject: String,

        /// Save the generated cards as a deck
        #[arg(long)]
        save_deck: Option<PathBuf>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Battle through a saved deck without any network access
    Play {
        /// Path to a deck .toml file
        #[arg(long)]
        deck: PathBuf,

        /// Message language: en or vi
        #[arg(long)]
        locale: Option<Locale>,
    },

    /// Check deck files for problems
    ValidateDeck {
        /// Path to deck file or directory
        #[arg(long)]
        deck: PathBuf,
    },

    /// MindMirror check-in: insights for how you feel
    Mood {
        /// Happy, Excited, Tired, Stressed or Sad
        #[arg(long)]
        mood: Mood,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Motivation score for a mood and progress summary
    Score {
        /// Free-text mood
        #[arg(long)]
        mood: Option<String>,

        /// JSON file with streak, timeSpent, skillGrowth, completedTasks
        #[arg(long)]
        progress: Option<PathBuf>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Talk to the Cogni assistant
    Chat {
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// List the prompt flows and their contracts
    Flows {
        /// Language of the templates shown
        #[arg(long)]
        locale: Option<Locale>,

        /// Print full template text
        #[arg(long)]
        templates: bool,

        /// Config file path (for template overrides)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example deck
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "cognitex=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Quest {
            subject,
            save_deck,
            service,
        } => commands::quest::execute(subject, save_deck, service).await,
        Commands::Play { deck, locale } => commands::play::execute(deck, locale),
        Commands::ValidateDeck { deck } => commands::validate_deck::execute(deck),
        Commands::Mood { mood, service } => commands::mood::execute(mood, service).await,
        Commands::Score {
            mood,
            progress,
            service,
        } => commands::score::execute(mood, progress, service).await,
        Commands::Chat { service } => commands::chat::execute(service).await,
        Commands::Flows {
            locale,
            templates,
            config,
        } => commands::flows::execute(locale, templates, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
