//! Docsearch CLI
//!
//! Encode documentation corpora, query them and serve them with a search API.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for docsearch.
#[derive(Parser)]
#[command(
    name = "docsearch",
    version,
    about = "Full-text search for static documentation sites"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "docsearch.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Encode plain page metadata into a dictionary-compressed corpus
    Encode {
        /// Page metadata as a JSON list or a path-keyed JSON map
        #[arg(short, long)]
        input: std::path::PathBuf,
        /// Where to write the encoded corpus
        #[arg(short, long, default_value = "search-data.json")]
        output: std::path::PathBuf,
    },
    /// Run a query against a corpus and print grouped results
    Query {
        /// Query text
        text: String,
        /// Corpus file (defaults to the configured data URL)
        #[arg(long)]
        corpus: Option<std::path::PathBuf>,
    },
    /// Serve static files and the search API
    Serve {
        /// Port to listen on (overrides the configured port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory to serve (overrides the configured root)
        #[arg(long)]
        root: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    docsearch::init_tracing(cli.verbose);

    match cli.command {
        Commands::Encode { input, output } => {
            docsearch::cmd::encode::run(&input, &output)?;
        }
        Commands::Query { text, corpus } => {
            docsearch::cmd::query::run(&cli.config, &text, corpus.as_deref()).await?;
        }
        Commands::Serve { port, root } => {
            docsearch::cmd::serve::run(&cli.config, port, root.as_deref()).await?;
        }
    }

    Ok(())
}
