pub mod init;
mod schema;

pub use schema::{Config, ReportConfig, SinkConfig, SinkKind};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEETS_RANGE: &str = "Sheet1";
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ISSUER: &str = "Pusbin JFPM";

/// Get the config directory path (~/.config/cat-score/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("cat-score")
}

/// Get the default config file path (~/.config/cat-score/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Directory report pages go to, with `~` expanded (default: current directory)
pub fn report_dir(report: &ReportConfig) -> PathBuf {
    report
        .output_dir
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/cat-score/config.yaml), and a missing default file yields
///   the default configuration (reports only, no sink).
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

/// Parse a sink timeout such as "10s" or "1500ms".
pub fn parse_timeout(value: &str) -> Result<Duration> {
    let timeout = humantime::parse_duration(value.trim())
        .with_context(|| format!("invalid duration '{}'", value))?;
    if timeout.is_zero() {
        anyhow::bail!("timeout must be greater than zero");
    }
    Ok(timeout)
}

/// Validate the sink section.
/// Returns all validation errors at once (not just the first).
pub fn validate_sink(sink: &SinkConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match sink.kind {
        SinkKind::Sheets => {
            if sink.sheet_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                errors.push("sink.sheet_key: required for kind 'sheets'".to_string());
            }
            if let Some(range) = &sink.range {
                if range.trim().is_empty() {
                    errors.push("sink.range: must not be empty".to_string());
                }
            }
            if let Some(endpoint) = &sink.endpoint {
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    errors.push(format!(
                        "sink.endpoint: '{}' must start with http:// or https://",
                        endpoint
                    ));
                }
            }
            if let Some(timeout) = &sink.timeout {
                if let Err(e) = parse_timeout(timeout) {
                    errors.push(format!("sink.timeout: {}", e));
                }
            }
            if sink.path.is_some() {
                errors.push("sink.path: only valid for kind 'file'".to_string());
            }
        }
        SinkKind::File => {
            if sink.path.is_none() {
                errors.push("sink.path: required for kind 'file'".to_string());
            }
            if sink.sheet_key.is_some() {
                errors.push("sink.sheet_key: only valid for kind 'sheets'".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_config_is_error() {
        let missing = std::env::temp_dir().join("cat_score_test_missing_config.yaml");
        let _ = fs::remove_file(&missing);
        assert!(load_config(Some(missing)).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "report:\n  issuer: \"Test Center\"\nsink:\n  kind: file\n  path: \"/tmp/r.tsv\"\n",
        )
        .unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.report.issuer.as_deref(), Some("Test Center"));
        assert_eq!(config.sink.unwrap().kind, SinkKind::File);
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "sink: [not, a, map").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_report_dir_defaults_to_cwd() {
        assert_eq!(report_dir(&ReportConfig::default()), PathBuf::from("."));
        let report = ReportConfig {
            output_dir: Some(PathBuf::from("/srv/reports")),
            ..Default::default()
        };
        assert_eq!(report_dir(&report), PathBuf::from("/srv/reports"));
    }

    #[test]
    fn test_valid_sheets_sink() {
        let mut sink = SinkConfig::sheets("abc");
        sink.timeout = Some("2s".to_string());
        assert!(validate_sink(&sink).is_ok());
    }

    #[test]
    fn test_sheets_sink_collects_all_errors() {
        let sink = SinkConfig {
            kind: SinkKind::Sheets,
            sheet_key: Some("  ".to_string()),
            range: Some(String::new()),
            endpoint: Some("ftp://example".to_string()),
            timeout: Some("soon".to_string()),
            path: Some(PathBuf::from("x")),
        };
        let errors = validate_sink(&sink).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors[0].contains("sink.sheet_key"));
        assert!(errors[3].contains("sink.timeout"));
    }

    #[test]
    fn test_file_sink_requires_path() {
        let mut sink = SinkConfig::file(PathBuf::from("/tmp/records.tsv"));
        assert!(validate_sink(&sink).is_ok());
        sink.path = None;
        let errors = validate_sink(&sink).unwrap_err();
        assert!(errors[0].contains("sink.path"));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_timeout("1500ms").unwrap(), Duration::from_millis(1500));
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("fast").is_err());
    }

    #[test]
    fn test_expand_home() {
        let plain = PathBuf::from("/etc/cat-score");
        assert_eq!(expand_home(&plain), plain);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/records.tsv")), home.join("records.tsv"));
        }
    }
}
