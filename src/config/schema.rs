use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
///
/// Example YAML:
/// ```yaml
/// report:
///   output_dir: "~/cat-reports"
///   logo_path: "~/cat-reports/logo.txt"
///   issuer: "Pusbin JFPM"
/// sink:
///   kind: sheets
///   sheet_key: "1AbC..."
///   range: "Sheet1"
///   timeout: "10s"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    /// Where records are appended. No sink means reports only.
    #[serde(default)]
    pub sink: Option<SinkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory for report pages (default: current directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Optional text banner printed at the top of each page
    #[serde(default)]
    pub logo_path: Option<PathBuf>,

    /// Sign-off line under "Best regards,"
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Google Sheets `values:append`
    Sheets,
    /// Local tab-separated file
    File,
}

/// Record sink settings. Which fields are required depends on `kind`;
/// see `validate_sink`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    pub kind: SinkKind,

    /// Spreadsheet id (sheets)
    #[serde(default)]
    pub sheet_key: Option<String>,

    /// A1 range or sheet name to append to (sheets, default "Sheet1")
    #[serde(default)]
    pub range: Option<String>,

    /// API base URL (sheets, default "https://sheets.googleapis.com")
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout as a duration, e.g. "10s" (sheets, default 10s)
    #[serde(default)]
    pub timeout: Option<String>,

    /// Record file (file)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SinkConfig {
    pub fn sheets(sheet_key: &str) -> Self {
        Self {
            kind: SinkKind::Sheets,
            sheet_key: Some(sheet_key.to_string()),
            range: None,
            endpoint: None,
            timeout: None,
            path: None,
        }
    }

    pub fn file(path: PathBuf) -> Self {
        Self {
            kind: SinkKind::File,
            sheet_key: None,
            range: None,
            endpoint: None,
            timeout: None,
            path: Some(path),
        }
    }
}
