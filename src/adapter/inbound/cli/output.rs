//! Terminal output for CLI handlers.
//!
//! Human-readable lines with colored symbols by default; one JSON object per
//! line with `--json`, so scripts can consume every command. `--quiet`
//! suppresses everything except warnings and errors.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde_json::json;

use super::command::ColorChoice;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Verbosity level (0 = normal, 1+ = increasingly verbose).
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    *config_cell().read()
}

/// Check if regular (non-JSON) output should be suppressed.
fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    *config_cell().write() = config;
}

/// Force colors on or off; `Auto` leaves terminal detection in charge.
pub fn apply_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

/// Return the global verbosity level from `-v` flags.
#[must_use]
pub fn verbosity() -> u8 {
    read_config().verbose
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("header", json!({ "app": "orderbell", "version": version }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("{} {}", "orderbell".bold(), version.dimmed());
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();

    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {:<14} {}", label.dimmed(), value);
}

pub fn success(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    if is_json() {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }

    eprintln!("  {} {}", "×".red(), message);
}

pub fn section(title: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!();
    println!("{}", title.bold());
}

/// Print a dimmed note.
pub fn note(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {}", message.dimmed());
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("lines", json!({ "content": content }));
        return;
    }
    if suppressed(config) {
        return;
    }

    for line in content.lines() {
        println!("    {line}");
    }
}

/// Print one rendered order notification.
pub fn notification(order_id: &str, text: &str, image_urls: &[String]) {
    let config = read_config();

    if config.json {
        emit_json_line(
            "notification",
            json!({ "order_id": order_id, "text": text, "images": image_urls }),
        );
        return;
    }
    if suppressed(config) {
        return;
    }

    println!();
    println!("  {} {}", "order".cyan(), order_id.bold());
    for line in text.lines() {
        println!("    {line}");
    }
    for url in image_urls {
        println!("    {} {}", "image".dimmed(), url.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_suppresses_only_human_output() {
        assert!(suppressed(OutputConfig::new(false, true, 0)));
        assert!(!suppressed(OutputConfig::new(true, true, 0)));
        assert!(!suppressed(OutputConfig::new(false, false, 2)));
    }
}
