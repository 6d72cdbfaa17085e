//! scriptmark CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "scriptmark", version, about = "Automated answer grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a submission bundle
    Grade {
        /// Path to a .toml exam bundle
        #[arg(long)]
        bundle: PathBuf,

        /// Scoring strategy: lexical or semantic (overrides config)
        #[arg(long)]
        strategy: Option<String>,

        /// Similarity match threshold (overrides config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Output directory
        #[arg(long, default_value = "./scriptmark-results")]
        output: PathBuf,

        /// Run the AI analysis step after grading
        #[arg(long)]
        analyze: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Analyze an already-graded bundle JSON
    Analyze {
        /// Path to a graded bundle JSON written by `grade`
        #[arg(long)]
        bundle: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./scriptmark-results")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate exam bundle TOML files
    Validate {
        /// Path to a bundle file or directory
        #[arg(long)]
        bundle: PathBuf,
    },

    /// Create starter config and example bundle
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scriptmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            bundle,
            strategy,
            threshold,
            output,
            analyze,
            config,
        } => commands::grade::execute(bundle, strategy, threshold, output, analyze, config).await,
        Commands::Analyze {
            bundle,
            output,
            config,
        } => commands::analyze::execute(bundle, output, config).await,
        Commands::Validate { bundle } => commands::validate::execute(bundle),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
