//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.
//! Colors are automatically disabled when output is piped.

use colored::{ColoredString, Colorize};

/// Initialize color support based on environment.
/// Call once at startup.
pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

// === Error Output ===

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn hint_label() -> ColoredString {
    "hint".cyan()
}

pub fn hint_text(msg: &str) -> ColoredString {
    msg.dimmed()
}

pub fn error_arrow() -> ColoredString {
    "-->".blue()
}

pub fn line_number(n: usize) -> ColoredString {
    format!("{:3}", n).blue().bold()
}

pub fn pipe() -> ColoredString {
    "|".blue()
}

pub fn caret() -> ColoredString {
    "^".red().bold()
}

pub fn hint_equals() -> ColoredString {
    "=".cyan()
}

// === Phase Output ===

pub fn banner_ok(phase: &str) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("{} OK", phase).green().bold(),
        "===".dimmed()
    )
}

pub fn banner_fail(phase: &str, count: usize) -> String {
    let msg = if count == 1 {
        format!("{} FAILED: 1 error", phase)
    } else {
        format!("{} FAILED: {} errors", phase, count)
    };
    format!("{} {} {}", "===".dimmed(), msg.red().bold(), "===".dimmed())
}

// === Compile Output ===

pub fn label(name: &str) -> ColoredString {
    name.yellow().bold()
}

pub fn ty(name: &str) -> ColoredString {
    if name == "State" {
        name.magenta().bold()
    } else {
        name.green()
    }
}

// === Process Output ===

pub fn event(name: &str) -> ColoredString {
    name.cyan().bold()
}

pub fn exit_status(code: Option<i32>) -> ColoredString {
    match code {
        Some(0) => "exit 0".green(),
        Some(code) => format!("exit {}", code).red(),
        None => "killed by signal".red(),
    }
}
