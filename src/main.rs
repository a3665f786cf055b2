//! # Prospan Lib CLI (`prospan`)
//!
//! ## Usage
//!
//! ```bash
//! prospan [--config ./config/prospan.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prospan shell` | Interactive session (dashboard, library, chat) |
//! | `prospan list` | List the built-in documents |
//! | `prospan show <id>` | Print one document |
//! | `prospan dashboard` | Print library statistics |
//! | `prospan ask "<query>"` | Answer one question from the library |
//! | `prospan extract <file>` | Extract metadata from a .txt/.md/.pdf/.docx file |
//! | `prospan serve` | Start the HTTP API |
//!
//! The AI-backed commands read the API key from the environment variable
//! named by `[ai].api_key_env` (default `API_KEY`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use prospan_lib::{config, extractor, library, logging, search, server, shell};

/// Prospan Lib: a document library with AI metadata extraction and
/// question answering.
#[derive(Parser)]
#[command(
    name = "prospan",
    about = "Prospan Lib: a document library with AI metadata extraction and question answering",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/prospan.toml` when that file exists, otherwise
    /// built-in defaults are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session.
    ///
    /// Type `help` inside the shell for the list of commands.
    Shell,

    /// List the documents in the library.
    List,

    /// Print a document's metadata and raw text.
    Show {
        /// Document id (see `prospan list`).
        id: String,
    },

    /// Print library statistics.
    Dashboard,

    /// Ask the library a question.
    Ask {
        /// The question.
        query: String,
    },

    /// Extract structured metadata from a file and print it as JSON.
    Extract {
        /// Path to a .txt, .md, .pdf or .docx file.
        file: PathBuf,
    },

    /// Start the HTTP API.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let cfg = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Shell => shell::run_shell(&cfg).await?,
        Commands::List => library::run_list()?,
        Commands::Show { id } => library::run_show(&id)?,
        Commands::Dashboard => library::run_dashboard()?,
        Commands::Ask { query } => search::run_ask(&cfg, &query).await?,
        Commands::Extract { file } => extractor::run_extract(&cfg, &file).await?,
        Commands::Serve => server::run_server(&cfg).await?,
    }

    Ok(())
}
