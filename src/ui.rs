use crate::types::{AnalysisResult, HistoryItem, MAX_VISIBLE_SUGGESTIONS};
use chrono::{Local, TimeZone};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fmt::Write;
use std::time::Duration;

/// Wrap width for replies and explanations
const WRAP_WIDTH: usize = 76;

// RGB tuple constants for use with the `colored` crate's `.truecolor()` method
pub mod rgb {
    pub const HOT_PINK: (u8, u8, u8) = (255, 64, 160);
    pub const CORAL: (u8, u8, u8) = (255, 106, 193);
    pub const SOFT_PURPLE: (u8, u8, u8) = (189, 147, 249);
    pub const NEON_CYAN: (u8, u8, u8) = (128, 255, 234);
    pub const ELECTRIC_YELLOW: (u8, u8, u8) = (241, 250, 140);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
    pub const DIM_SEPARATOR: (u8, u8, u8) = (60, 60, 70);
}

/// Track quiet mode state
static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    let mut quiet_mode = QUIET_MODE.lock();
    *quiet_mode = enabled;
}

/// Check if quiet mode is enabled
pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

pub fn create_spinner(message: &str) -> ProgressBar {
    // Don't create a spinner in quiet mode
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("♡♥❤♥♡✦")
        .template("{spinner:.magenta.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Always print errors, even in quiet mode
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.green().bold());
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            "💘 RizzMaster".magenta().bold(),
            "version".cyan(),
            version.green()
        );
    }
}

/// Print an empty line (respects quiet mode)
pub fn print_newline() {
    if !is_quiet_mode() {
        println!();
    }
}

fn paint(text: &str, color: (u8, u8, u8)) -> colored::ColoredString {
    text.truecolor(color.0, color.1, color.2)
}

fn separator() -> String {
    paint(&"━".repeat(50), rgb::DIM_SEPARATOR).to_string()
}

fn indent_wrapped(text: &str, indent: &str) -> String {
    textwrap::wrap(text, WRAP_WIDTH.saturating_sub(indent.len()))
        .iter()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a result as terminal text.
///
/// Only the newest [`MAX_VISIBLE_SUGGESTIONS`] cards are shown.
pub fn format_result(result: &AnalysisResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", separator());
    let _ = writeln!(out, "{}", paint(&result.summary, rgb::HOT_PINK).bold());
    let _ = writeln!(out, "{}", separator());

    let skip = result
        .suggestions
        .len()
        .saturating_sub(MAX_VISIBLE_SUGGESTIONS);
    for (i, suggestion) in result.suggestions.iter().skip(skip).enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} {}",
            paint(&format!("{}.", i + 1), rgb::CORAL).bold(),
            paint(&suggestion.tone.to_uppercase(), rgb::SOFT_PURPLE).bold()
        );
        let _ = writeln!(out, "{}", indent_wrapped(&suggestion.reply, "   ").bold());
        if !suggestion.explanation.is_empty() {
            let _ = writeln!(
                out,
                "{}",
                paint(&indent_wrapped(&suggestion.explanation, "   "), rgb::DIM_WHITE).italic()
            );
        }
    }

    if let Some(links) = result.grounding_links.as_ref().filter(|l| !l.is_empty()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", paint("SOURCES", rgb::NEON_CYAN).bold());
        for link in links {
            let _ = writeln!(
                out,
                "  {} {}",
                paint("↗", rgb::NEON_CYAN),
                link.title.bold()
            );
            let _ = writeln!(out, "    {}", paint(&link.url, rgb::DIM_WHITE).underline());
        }
    }

    out
}

/// Print a result (always printed, even in quiet mode)
pub fn print_result(result: &AnalysisResult) {
    print!("{}", format_result(result));
}

/// Print the history list, newest first
pub fn print_history(history: &[HistoryItem]) {
    if history.is_empty() {
        print_info("No history yet.");
        return;
    }

    for (i, item) in history.iter().enumerate() {
        let when = Local
            .timestamp_millis_opt(item.timestamp)
            .single()
            .map_or_else(|| "unknown".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        let label: String = item.label().chars().take(60).collect();

        println!(
            "{} {} {} {}",
            paint(&format!("{:>2}.", i + 1), rgb::CORAL).bold(),
            paint(&when, rgb::DIM_WHITE),
            paint(&format!("[{}/{}]", item.mode, item.tone), rgb::ELECTRIC_YELLOW),
            label
        );
    }
}
