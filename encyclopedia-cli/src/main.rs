//! # encyclopedia CLI
//!
//! Command-line interface and web server for the encyclopedia wiki.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "encyclopedia")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to ./encyclopedia.yml when present)
    #[arg(long, env = "ENCYCLOPEDIA_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new encyclopedia with a few starter entries
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Serve the wiki over HTTP
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,

        /// Seed for the random page picker
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List every entry title
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print one entry (title matched ignoring case)
    Show {
        /// Entry title
        title: String,

        /// Print rendered HTML instead of markdown
        #[arg(long)]
        html: bool,
    },

    /// Search entries: an exact title match wins, otherwise content is searched
    Search {
        /// Search query
        query: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new entry
    Create {
        /// Entry title
        title: String,

        /// Markdown content
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,

        /// Read markdown content from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print a randomly chosen entry title
    Random {
        /// Seed for reproducible picks
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Serve { host, port, seed } => {
            let opts = commands::ServeOptions { host, port, seed };
            commands::serve(config, opts).await
        }
        Commands::List { json } => commands::list_entries(config, json),
        Commands::Show { title, html } => commands::show_entry(config, &title, html),
        Commands::Search { query, json } => commands::search_entries(config, &query, json),
        Commands::Create {
            title,
            content,
            file,
        } => {
            let content = commands::read_content(content, file.as_deref())?;
            commands::create_entry(config, &title, &content)
        }
        Commands::Random { seed } => commands::random_entry(config, seed),
    }
}
