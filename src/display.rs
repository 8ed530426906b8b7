// ============================================================================
// File: src/display.rs
// Terminal rendering of results, history and health
// ============================================================================

use chrono::{DateTime, Local};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::health::HealthState;
use crate::history::HistoryEntry;
use crate::models::{describe_temperature, RequestType};
use crate::session::AnalysisOutcome;

pub fn print_header(request_type: RequestType, temperature: f32) {
    println!("{}", "\n═══════════════════════════════════════".bright_blue());
    println!("{}", "            ISITTRUE ANALYZER".bright_white().bold());
    println!("{}", "═══════════════════════════════════════".bright_blue());
    println!("\n{}: {}", "Mode".green().bold(), request_type.label());
    println!(
        "{}: {} ({})\n",
        "Response style".green().bold(),
        describe_temperature(temperature),
        temperature
    );
}

pub fn print_result(outcome: &AnalysisOutcome) {
    let style = outcome.verdict.style();

    println!(
        "\n{} {}  {}",
        style.symbol.color(style.color).bold(),
        style.label.color(style.color).bold(),
        outcome.response.request_type.label().bright_black()
    );
    println!("{}", "─".repeat(40).bright_black());

    for line in outcome.response.result.lines() {
        println!("{}", line);
    }

    let mut meta = Vec::new();
    if let Some(timestamp) = &outcome.response.timestamp {
        meta.push(format!("🕒 {}", format_service_timestamp(timestamp)));
    }
    if let Some(model) = &outcome.response.model {
        meta.push(format!("⚙ {}", model));
    }
    if !meta.is_empty() {
        println!("{}", "─".repeat(40).bright_black());
        println!("{}", meta.join("   ").bright_black());
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    println!(
        "\n{} {} {}",
        "●".bright_cyan(),
        "History".bright_white().bold(),
        format!("({})", entries.len()).bright_black()
    );
    println!("{}", "─".repeat(40).bright_black());

    if entries.is_empty() {
        println!("{}", "No history yet".bright_black());
        return;
    }

    for entry in entries {
        let local: DateTime<Local> = entry.timestamp.with_timezone(&Local);
        println!(
            "{} {}",
            entry.request_type.label().cyan(),
            local.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
        println!("  {}", entry.text.bright_white());
        println!("  {}", entry.result.bright_black().italic());
    }
}

pub fn print_health(state: &HealthState) {
    match state {
        HealthState::Reported(status) if status.is_healthy() => {
            println!("{} Service {}", "●".green().bold(), status.status.green());
        }
        HealthState::Reported(status) => {
            println!("{} Service {}", "●".red().bold(), status.status.red());
        }
        HealthState::Unknown => {
            println!("{} Service status {}", "●".bright_black(), "unknown".bright_black());
        }
    }
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_success(message: impl std::fmt::Display) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

// The service sends naive ISO-8601 local times; show anything unparseable as-is
fn format_service_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}
