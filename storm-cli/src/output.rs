use crate::{GlobalOptions, OutputFormat, GLOBAL_OPTS};
use colored::*;
use serde::Serialize;
use std::io;

/// Global options, or the defaults when running outside `main`
pub fn opts() -> &'static GlobalOptions {
    GLOBAL_OPTS.get_or_init(GlobalOptions::default)
}

/// Whether human-readable text goes to stdout
pub fn text_enabled() -> bool {
    let opts = opts();
    !opts.quiet && opts.output == OutputFormat::Text
}

/// Print output according to the global format settings
pub fn print_output<T: Serialize>(data: &T) -> Result<(), io::Error> {
    let opts = opts();

    if opts.quiet {
        return Ok(());
    }

    match opts.output {
        OutputFormat::Json => print_json(data),
        OutputFormat::Text => Ok(()), // Text output is handled by individual commands
    }
}

/// Print JSON output
pub fn print_json<T: Serialize>(data: &T) -> Result<(), io::Error> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// Print verbose message (only if verbose mode is on)
pub fn verbose_println(level: u8, message: &str) {
    let opts = opts();

    if !opts.quiet && opts.verbose >= level {
        eprintln!("{} {}", "[VERBOSE]".dimmed(), message);
    }
}

/// Report an error with its cause chain on stderr
pub fn print_error(error: &anyhow::Error) {
    if use_color() {
        eprintln!("{} {}", "✗".red().bold(), error.to_string().red());
    } else {
        eprintln!("✗ {}", error);
    }
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
}

/// Check if we should use color
pub fn use_color() -> bool {
    let opts = opts();
    !opts.no_color && opts.output == OutputFormat::Text
}
