//! hubwire CLI - Proxy generator for hub contracts
//!
//! Commands:
//! - `hubwire generate` - Generate proxy sources from annotated declarations
//! - `hubwire check` - Scan and report diagnostics without writing

use clap::{Parser, Subcommand};
use hubwire_codegen::{Diagnostic, Severity};

mod check;
mod config;
mod generate;

#[derive(Parser)]
#[command(name = "hubwire")]
#[command(author, version, about = "Proxy generator for hubwire hub contracts", long_about = None)]
struct Cli {
    /// Verbose logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate proxy sources from annotated declarations
    Generate {
        /// Directory to scan for contracts and declarations
        #[arg(short, long)]
        source: Option<String>,

        /// Directory to write generated artifacts to
        #[arg(short, long)]
        output: Option<String>,

        /// Emit capability traits implemented by the role types
        #[arg(short, long)]
        interfaces: bool,

        /// Path to hubwire.toml (default: ./hubwire.toml when present)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Scan and report diagnostics without writing artifacts
    Check {
        /// Directory to scan for contracts and declarations
        #[arg(short, long)]
        source: Option<String>,

        /// Path to hubwire.toml (default: ./hubwire.toml when present)
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            source,
            output,
            interfaces,
            config,
        } => {
            generate::run(source, output, interfaces, config)?;
        }
        Commands::Check { source, config } => {
            check::run(source, config)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Print diagnostics to stderr, one line each.
pub(crate) fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!(
            "{severity}: {}: {}",
            diagnostic.declaration, diagnostic.message
        );
    }
}
