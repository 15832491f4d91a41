use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::report::{format_number, ScoreRecord};
use crate::scoring::{ConversionTable, TestKind};
use crate::submit::Persistence;

/// Widest name shown in the history table before truncation
const NAME_WIDTH: usize = 24;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Final score as printed everywhere: two decimals
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Multi-line result for a freshly scored record
pub fn format_result(record: &ScoreRecord, use_colors: bool) -> String {
    let mut lines = Vec::new();
    let values = record.subject_cells();

    for (i, (subject, value)) in record.test.subjects().iter().zip(values.iter()).enumerate() {
        let label = match (record.test, record.raw) {
            (TestKind::Tbi, Some(raw)) => format!("{} -> {}", format_number(raw[i]), value.to_text()),
            _ => value.to_text(),
        };
        lines.push(format!("  {:<10} {}", format!("{}:", subject.label()), label));
    }

    let final_line = format!("{} score: {}", record.test.tag(), format_score(record.final_score));
    if use_colors {
        lines.push(format!("  {}", final_line.bold()));
    } else {
        lines.push(format!("  {}", final_line));
    }

    if let Some(band) = record.band {
        if use_colors {
            lines.push(format!("  Band: {}", band.label().cyan()));
        } else {
            lines.push(format!("  Band: {}", band.label()));
        }
    }

    lines.join("\n")
}

/// One status line describing what happened to the record
pub fn format_persistence(persistence: &Persistence, use_colors: bool) -> String {
    match persistence {
        Persistence::Saved { target } => success(&format!("Record saved to {}", target), use_colors),
        Persistence::Failed { target, error } => warning(
            &format!("Report created but the record was not saved to {}: {}", target, error),
            use_colors,
        ),
        Persistence::NotConnected { reason } => {
            info(&format!("Report only, record not saved ({})", reason), use_colors)
        }
    }
}

pub fn success(message: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{} {}", "✓".green(), message)
    } else {
        format!("OK: {}", message)
    }
}

pub fn warning(message: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{} {}", "!".yellow().bold(), message.yellow())
    } else {
        format!("WARNING: {}", message)
    }
}

pub fn info(message: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{} {}", "i".blue(), message.dimmed())
    } else {
        format!("NOTE: {}", message)
    }
}

/// Print a conversion grid in `columns` side-by-side "raw -> converted" pairs.
pub fn format_conversion_table(table: &ConversionTable, columns: usize, use_colors: bool) -> String {
    let columns = columns.max(1);
    let heading = format!(
        "{} (raw {} to {}, step {})",
        table.subject().label(),
        format_number(table.min()),
        format_number(table.max()),
        format_number(table.step())
    );

    let mut lines = vec![if use_colors {
        heading.bold().to_string()
    } else {
        heading
    }];

    let rows = table.entries().len().div_ceil(columns);
    for row in 0..rows {
        let line = (0..columns)
            .filter_map(|col| table.entries().get(col * rows + row))
            .map(|(raw, converted)| format!("{:>5} -> {:<3}", format_number(*raw), converted))
            .collect::<Vec<_>>()
            .join("   ");
        lines.push(format!("  {}", line.trim_end()));
    }

    lines.join("\n")
}

/// Truncate a name to fit the column, counting chars not bytes
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format records as a table with columns: Index, Age, Test, Name, Score, Band.
/// Newest first as given; no headers.
pub fn format_history_table(records: &[ScoreRecord], now: NaiveDateTime, use_colors: bool) -> String {
    if records.is_empty() {
        return "No records found.".to_string();
    }

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let index_str = format!("{:>3}.", idx + 1);
            let age = format!("{:>4}", format_age(now - record.timestamp));
            let name = format!("{:<width$}", truncate_name(&record.name, NAME_WIDTH), width = NAME_WIDTH);
            let score = format!("{:>7}", format_score(record.final_score));
            let band = record.band.map(|b| b.code()).unwrap_or("");

            if use_colors {
                format!(
                    "{} {}  {}  {}  {}  {}",
                    index_str.dimmed(),
                    age.dimmed(),
                    record.test.tag(),
                    name,
                    score.bold(),
                    band.cyan()
                )
            } else {
                format!(
                    "{} {}  {}  {}  {}  {}",
                    index_str,
                    age,
                    record.test.tag(),
                    name,
                    score,
                    band
                )
                .trim_end()
                .to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format records as tab-separated values for scripting.
/// Columns: timestamp, test, name, final_score, band, uid (no headers, no colors)
pub fn format_history_tsv(records: &[ScoreRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                record.timestamp_text(),
                record.test.tag(),
                record.name,
                format_score(record.final_score),
                record.band.map(|b| b.code()).unwrap_or(""),
                record.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format records as a JSON array, one object per record
pub fn format_history_json(records: &[ScoreRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize records")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}
