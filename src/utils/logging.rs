// file: src/utils/logging.rs
// description: Tracing subscriber initialization with optional ANSI coloring

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so answers on stdout stay clean. `RUST_LOG` wins over
/// the verbosity flag.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose {
        "debug,lance=info,lancedb=info"
    } else {
        "info,lance=warn,lancedb=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    colored::control::set_override(colored_output);
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

pub fn format_human(msg: &str) -> String {
    format!("{} {}", "human>".cyan().bold(), msg)
}

pub fn format_ai(msg: &str) -> String {
    format!("{} {}", "ai>".magenta().bold(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatters_keep_message() {
        colored::control::set_override(false);
        assert_eq!(format_human("hello"), "human> hello");
        assert_eq!(format_ai("hi"), "ai> hi");
        assert_eq!(format_error("boom"), "✗ boom");
        assert!(format_warning("careful").ends_with("careful"));
    }
}
