//! Console output: leveled messages, the version table and the commit list.
//!
//! Printing here never terminates the process; deciding to exit is left to
//! the binary.

use console::{measure_text_width, pad_str, style, Alignment, Style};

use crate::boundary::BoundaryWarning;
use crate::domain::{CommitLogEntry, VersionCheck};

/// Severity of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Notice,
    Error,
    Plain,
}

impl Level {
    fn style(&self) -> Style {
        match self {
            Level::Info => Style::new().green(),
            Level::Warn => Style::new().yellow(),
            Level::Notice => Style::new().cyan(),
            Level::Error => Style::new().red(),
            Level::Plain => Style::new(),
        }
    }
}

/// Print `message` at `level`, indented by `spaces`. Errors go to stderr.
pub fn print(level: Level, message: &str, spaces: usize) {
    let line = format!("{}{}", " ".repeat(spaces), level.style().apply_to(message));
    if level == Level::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    print(Level::Error, message, 0);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    print(Level::Info, &format!("✔ {}", message), 0);
}

/// Format and print a green status message.
pub fn display_info(message: &str) {
    print(Level::Info, message, 0);
}

pub fn display_warning(message: &str) {
    print(Level::Warn, message, 0);
}

pub fn display_notice(message: &str) {
    print(Level::Notice, message, 0);
}

pub fn display_message(message: &str, spaces: usize) {
    print(Level::Plain, message, spaces);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().bold(), warning);
}

/// Attention-getting report for errors nobody anticipated
pub fn display_unexpected(error: &dyn std::fmt::Display) {
    eprintln!("{}", style("Unexpected error:").red().bold());
    eprintln!("{}", style(error).red());
}

/// One line per commit, as offered by the commit picker
pub fn display_commit_log(entries: &[CommitLogEntry]) {
    for entry in entries {
        println!("{}", entry.display_line());
    }
}

/// Render a boxed table. Column widths follow the widest visible cell.
pub fn render_table(header: &[&str], rows: &[Vec<String>], tone: &Style) -> String {
    let columns = header.len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| measure_text_width(cell))
                .chain(std::iter::once(measure_text_width(header[col])))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {} ", pad_str(cell, *width, Alignment::Left, None)))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(rule("┌", "┬", "┐"));
    out.push(line(
        header
            .iter()
            .map(|h| style(h).red().to_string())
            .collect(),
    ));
    out.push(rule("├", "┼", "┤"));
    for row in rows {
        out.push(line(
            row.iter().map(|cell| tone.apply_to(cell).to_string()).collect(),
        ));
    }
    out.push(rule("└", "┴", "┘"));
    out.join("\n")
}

/// Two-row comparison of the source and main branch versions.
///
/// Green when the source is ahead, yellow otherwise (including an unknown
/// comparison).
pub fn version_table(
    manifest: &str,
    source_hash: &str,
    source_version: &str,
    main_branch: &str,
    main_version: &str,
    check: Option<VersionCheck>,
) -> String {
    let tone = match check {
        Some(check) if check.is_healthy() => Style::new().green(),
        _ => Style::new().yellow(),
    };
    let version_header = format!("{} version", manifest);
    render_table(
        &["git", &version_header],
        &[
            vec![source_hash.to_string(), source_version.to_string()],
            vec![main_branch.to_string(), main_version.to_string()],
        ],
        &tone,
    )
}
