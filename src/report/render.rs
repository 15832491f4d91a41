use std::fs;
use std::path::Path;

use super::record::ScoreRecord;
use crate::config::{expand_home, ReportConfig, DEFAULT_ISSUER};
use crate::scoring::TestKind;

const PAGE_WIDTH: usize = 76;
const COLUMN_WIDTH: usize = 24;

const TITLE: &str = "Test Score Report";
const DISCLAIMER: [&str; 2] = [
    "Note : this result comes from a practice test and cannot be used for",
    "       any scholarship selection.",
];

/// Presentation settings for the printable page.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Optional banner printed above the title
    pub logo: Option<String>,
    /// Sign-off line under "Best regards,"
    pub issuer: String,
}

impl ReportOptions {
    /// Resolve settings from config, loading the logo if one is configured.
    pub fn from_config(report: &ReportConfig) -> Self {
        let logo_path = report.logo_path.as_deref().map(expand_home);
        Self {
            logo: load_logo(logo_path.as_deref()),
            issuer: report
                .issuer
                .clone()
                .unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
        }
    }
}

/// Load the optional banner. Any failure leaves the report without a logo.
pub fn load_logo(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => Some(text.trim_end().to_string()),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "logo file is empty, skipping");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not load logo, skipping");
            None
        }
    }
}

/// Render a record as a fixed-width printable page.
pub fn render_report(record: &ScoreRecord, options: &ReportOptions) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{:>width$}",
        format!("Printed: {}", record.timestamp_text()),
        width = PAGE_WIDTH
    ));
    if let Some(logo) = &options.logo {
        lines.extend(logo.lines().map(str::to_string));
    }
    lines.push(center(TITLE));
    lines.push(String::new());
    lines.push(format!("Name: {}", record.name));
    lines.push(String::new());

    let value_header = match record.test {
        TestKind::Tpa => "Score",
        TestKind::Tbi => "Converted score",
    };
    let rule = table_rule();
    lines.push(rule.clone());
    lines.push(table_row("Subtest", value_header));
    lines.push(rule.clone());
    for (subject, cell) in record.test.subjects().iter().zip(record.subject_cells()) {
        lines.push(table_row(subject.label(), &cell.to_text()));
    }
    lines.push(rule.clone());
    lines.push(table_row(
        &format!("{} score", record.test.tag()),
        &format!("{:.2}", record.final_score),
    ));
    lines.push(rule);

    if let Some(band) = record.band {
        lines.push(String::new());
        lines.push(format!("Band : {}", band.label()));
    }

    lines.push(String::new());
    lines.extend(DISCLAIMER.iter().map(|l| l.to_string()));
    lines.push(String::new());
    lines.push(String::new());
    lines.push(center("Best regards,"));
    if !options.issuer.is_empty() {
        lines.push(center(&options.issuer));
    }
    lines.push(String::new());
    lines.push(format!("Record ID: {}", record.id));

    let mut page = lines.join("\n");
    page.push('\n');
    page
}

fn center(text: &str) -> String {
    format!("{:^width$}", text, width = PAGE_WIDTH)
        .trim_end()
        .to_string()
}

fn table_rule() -> String {
    format!(
        "+{}+{}+",
        "-".repeat(COLUMN_WIDTH + 2),
        "-".repeat(COLUMN_WIDTH + 2)
    )
}

fn table_row(label: &str, value: &str) -> String {
    format!(
        "| {:<width$} | {:^width$} |",
        label,
        value,
        width = COLUMN_WIDTH
    )
}
