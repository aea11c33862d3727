use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use gpusense_core::{Analyzer, AnalyzerConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gpusense_manager::{report, scanner};

#[derive(Parser)]
#[command(name = "gpusense")]
#[command(about = "gpusense - predict whether Python sources want a CPU or a GPU")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Analyzer configuration file (TOML); built-in defaults otherwise
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every Python file under a directory
    Scan {
        /// Directory to scan (defaults to the current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Also analyze files whose name contains "test"
        #[arg(short = 't', long = "include-tests")]
        include_tests: bool,

        /// Descend into hidden and virtualenv directories
        #[arg(short = 'a', long = "all")]
        include_hidden: bool,

        /// Skip paths containing this substring (repeatable)
        #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Print a colored per-mode summary to stderr
        #[arg(short = 's', long = "summary")]
        summary: bool,

        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Classify a single Python file
    File {
        /// File to analyze
        file: PathBuf,

        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Print the default analyzer configuration as TOML
    Config,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpusense=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command, cli.config.as_deref()) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_analyzer(config: Option<&Path>) -> Result<Analyzer> {
    let config = match config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    Ok(Analyzer::new(config))
}

fn run_command(command: Commands, config: Option<&Path>) -> Result<()> {
    match command {
        Commands::Scan {
            path,
            include_tests,
            include_hidden,
            exclude,
            summary,
            compact,
        } => {
            if !path.is_dir() {
                anyhow::bail!("'{}' is not a directory", path.display());
            }

            let analyzer = load_analyzer(config)?;
            let options = scanner::ScanOptions {
                include_tests,
                include_hidden,
                exclude,
            };
            let results = scanner::scan_directory(&path, &analyzer, &options);

            println!("{}", report::render_json(&results, compact)?);
            if summary {
                report::print_summary(&results);
            }
            Ok(())
        }

        Commands::File { file, compact } => {
            let analyzer = load_analyzer(config)?;
            let result = analyzer.analyze_file(&file);
            println!("{}", report::render_json(&result, compact)?);
            Ok(())
        }

        Commands::Config => {
            let analyzer = load_analyzer(config)?;
            print!("{}", analyzer.config().to_toml_string()?);
            Ok(())
        }
    }
}
