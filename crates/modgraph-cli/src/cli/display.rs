//! Common display utilities for CLI commands.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use modgraph::Risk;
use serde::Serialize;

const MAX_DISPLAY_ITEMS: usize = 10;
const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

impl OutputMode {
    /// Pick the mode from the `--json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Write `value` to stdout as pretty JSON followed by a newline.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)
}

/// Display a list of module keys with truncation.
///
/// Shows up to `MAX_DISPLAY_ITEMS` keys with bullet points. If there are more,
/// shows "... and N more". If empty, shows the provided `empty_message`.
pub fn print_modules(keys: &[String], empty_message: &str) {
    if keys.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for key in keys.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {key}", "•".dimmed());
    }

    if keys.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            keys.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Print `text` wrapped to the terminal width, indented by `indent` spaces.
pub fn print_wrapped(text: &str, indent: usize) {
    let pad = " ".repeat(indent);
    for line in wrap_text(text, terminal_width().saturating_sub(indent)) {
        println!("{pad}{line}");
    }
}

/// Color a risk level the way the impact report shows it.
pub fn colorize_risk(risk: Risk) -> ColoredString {
    let label = risk.to_string();
    match risk {
        Risk::Low => label.green().bold(),
        Risk::Medium => label.yellow().bold(),
        Risk::High => label.red().bold(),
    }
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.max(20))
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| usize::from(w.0))
}
