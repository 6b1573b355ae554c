//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::{CommissionLine, LevelReport};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print success status indented (green checkmark with leading spaces)
pub fn success_detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One level as `level 2: 9/9 (1 borrowed)`.
pub fn level_text(report: &LevelReport) -> String {
    let mut text = format!(
        "level {}: {}/{}",
        report.level, report.assigned, report.expected
    );
    if report.borrowed > 0 {
        text.push_str(&format!(" ({} borrowed)", report.borrowed));
    }
    if !report.complete {
        text.push_str(&format!(", {} missing", report.missing()));
    }
    text
}

/// Print a level with a completion mark.
pub fn level(report: &LevelReport) {
    if report.complete {
        success_detail(&level_text(report));
    } else {
        failure(&level_text(report));
    }
}

/// One commission row as `level 1: 30.00`.
pub fn commission_text(line: &CommissionLine) -> String {
    format!("level {}: {}", line.level, line.amount)
}

/// Print a commission row, marked as earned or pending.
pub fn commission(line: &CommissionLine) {
    if line.complete {
        success_detail(&commission_text(line));
    } else {
        detail(&format!("· {}", commission_text(line)));
    }
}
