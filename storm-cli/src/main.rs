//! Storm CLI - list and extract MPQ archives through StormLib
//!
//! The binary is named `storm-cli` to avoid conflicts with the `stormlib` library crate.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::OnceLock;
use stormlib::Storm;

mod commands;
mod config;
mod output;

/// Environment variable naming the StormLib shared library
pub const LIBRARY_ENV: &str = "STORMLIB_PATH";

// Global context for commands to access
pub static GLOBAL_OPTS: OnceLock<GlobalOptions> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub output: OutputFormat,
    pub verbose: u8,
    pub quiet: bool,
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "storm-cli",
    about = "Command-line tool for listing and extracting MPQ archives",
    long_about = None,
    after_help = "EXAMPLES:
    # List every file in an archive
    storm-cli list d2data.mpq

    # List excel tables from several archives
    storm-cli list d2data.mpq d2exp.mpq --filter \"data/global/excel/*.txt\"

    # Extract all files into extracted/
    storm-cli extract d2data.mpq --target extracted/

    # Use a specific StormLib build
    storm-cli --library /opt/stormlib/libstorm.so list d2data.mpq

    # Generate shell completions
    storm-cli completion bash > ~/.bash_completion.d/storm-cli.bash
    storm-cli completion zsh > ~/.zsh/completions/_storm-cli
    storm-cli completion fish > ~/.config/fish/completions/storm-cli.fish

FILTERS:
    Filters match the lowercase, slash-separated paths from the archive's
    (listfile). `*` stays within one directory, `**` crosses directories.

LIBRARY:
    StormLib is loaded from --library, then $STORMLIB_PATH, then the
    `library` key of ~/.storm-cli/config.toml, then the platform default
    (libstorm.so, libstorm.dylib or storm.dll)."
)]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(global = true, short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(global = true, short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(global = true, short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored output
    #[arg(global = true, long)]
    no_color: bool,

    /// Path to the StormLib shared library
    #[arg(global = true, long, value_name = "PATH")]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files in one or more archives
    List {
        /// Paths to the MPQ archives
        #[arg(required = true)]
        archives: Vec<PathBuf>,
        /// Wildcard filter over archive paths [default: **]
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Extract files from one or more archives
    Extract {
        /// Paths to the MPQ archives
        #[arg(required = true)]
        archives: Vec<PathBuf>,
        /// Wildcard filter over archive paths [default: **]
        #[arg(short, long)]
        filter: Option<String>,
        /// Target directory [default: .]
        #[arg(short, long)]
        target: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    #[command(about = "Generate completion scripts for your shell")]
    Completion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Pick the StormLib path: command line, then environment, then config file
fn library_path(
    flag: Option<PathBuf>,
    env: Option<OsString>,
    config: Option<&Path>,
) -> Option<PathBuf> {
    flag.or_else(|| env.filter(|value| !value.is_empty()).map(PathBuf::from))
        .or_else(|| config.map(Path::to_path_buf))
}

fn open_storm(path: Option<PathBuf>) -> Result<Storm> {
    let storm = match path {
        Some(path) => Storm::load(&path)
            .with_context(|| format!("Failed to load StormLib from {}", path.display()))?,
        #[cfg(feature = "link")]
        None => Storm::linked(),
        #[cfg(not(feature = "link"))]
        None => Storm::load_default().with_context(|| {
            format!(
                "Failed to load StormLib ({}); pass --library or set {}",
                stormlib::default_library_name(),
                LIBRARY_ENV
            )
        })?,
    };
    log::info!("Using StormLib from {}", storm.origin());
    Ok(storm)
}

fn run(cli: Cli) -> Result<bool> {
    let config = config::load_config(None).context("Failed to load configuration")?;
    let library = library_path(
        cli.library,
        std::env::var_os(LIBRARY_ENV),
        config.library.as_deref(),
    );

    match cli.command {
        Commands::List { archives, filter } => {
            let filter = filter.or(config.filter).unwrap_or_else(|| "**".into());
            let filter = commands::Filter::new(&filter)?;
            let storm = open_storm(library)?;
            commands::list::list(&storm, &archives, &filter)
        }
        Commands::Extract {
            archives,
            filter,
            target,
        } => {
            let filter = filter.or(config.filter).unwrap_or_else(|| "**".into());
            let filter = commands::Filter::new(&filter)?;
            let storm = open_storm(library)?;
            let target = target.or(config.target).unwrap_or_else(|| PathBuf::from("."));
            commands::extract::extract(&storm, &archives, &filter, &target)
        }
        Commands::Completion { shell } => {
            // Generate completion script for the specified shell
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up colored output based on flags
    if cli.no_color || cli.output != OutputFormat::Text {
        colored::control::set_override(false);
    }

    // Configure logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Store global options for commands to access
    GLOBAL_OPTS.get_or_init(|| GlobalOptions {
        output: cli.output,
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
