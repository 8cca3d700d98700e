//! redwood — a personal website in one binary.
//!
//! Serves bookmarks, photo galleries, notes and files; the notes and
//! files live behind a stateless signed-token login.

mod auth;
mod bookmarks;
mod config;
mod gateway;
mod photos;
mod storage;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "redwood",
    version,
    about = "Personal website: bookmarks, photos, notes and files."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on.
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
    /// Lint the bookmarks JSON file; exits non-zero on problems.
    ValidateBookmarks {
        /// Path to the bookmarks file (defaults to the configured one).
        #[arg(long)]
        file: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::Config::from_env();

    match cli.command.unwrap_or(Command::Serve {
        host: "127.0.0.1".into(),
        port: 5000,
    }) {
        Command::Serve { host, port } => gateway::run_gateway(&host, port, config).await,
        Command::ValidateBookmarks { file } => {
            let path = file.unwrap_or(config.bookmarks_filename);
            let errors = bookmarks::validate_file(&path)?;
            if errors.is_empty() {
                println!("Validation succeeded.");
                return Ok(());
            }
            for error in &errors {
                eprintln!("{error}");
            }
            anyhow::bail!("{} problem(s) found in {}", errors.len(), path.display())
        }
    }
}
