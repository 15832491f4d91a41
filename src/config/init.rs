use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use crate::config::{
    get_config_path, parse_timeout, validate_sink, Config, ReportConfig, SinkConfig, SinkKind,
    DEFAULT_ISSUER, DEFAULT_SHEETS_RANGE,
};
use crate::prompt::{prompt_with_default, prompt_yes_no};

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(12));
    }
    println!();
}

/// Ask until `check` accepts the answer.
fn ask_valid<A>(
    ask: &mut A,
    label: &str,
    default: &str,
    check: impl Fn(&str) -> Result<(), String>,
) -> Result<String>
where
    A: FnMut(&str, &str) -> Result<String>,
{
    loop {
        let value = ask(label, default)?;
        match check(&value) {
            Ok(()) => return Ok(value),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

fn optional_path(value: String) -> Option<PathBuf> {
    if value.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(value.trim()))
    }
}

/// Build a config from answers. `ask(label, default)` returns free text,
/// `confirm(label, default_yes)` a yes/no answer.
pub fn build_config_with<A, C>(mut ask: A, mut confirm: C) -> Result<Config>
where
    A: FnMut(&str, &str) -> Result<String>,
    C: FnMut(&str, bool) -> Result<bool>,
{
    // 1. Report settings
    let output_dir = optional_path(ask("Directory for report pages", ".")?);
    let logo_path = optional_path(ask("Logo banner file (empty for none)", "")?);
    let issuer = ask("Sign-off line", DEFAULT_ISSUER)?;

    let report = ReportConfig {
        output_dir,
        logo_path,
        issuer: Some(issuer).filter(|s| s != DEFAULT_ISSUER && !s.trim().is_empty()),
    };

    // 2. Record sink
    let sink = if confirm("Save every record to an external sink?", true)? {
        let kind = ask_valid(&mut ask, "Sink kind (sheets/file)", "sheets", |v| match v {
            "sheets" | "file" => Ok(()),
            _ => Err("expected 'sheets' or 'file'".to_string()),
        })?;

        let sink = if kind == "file" {
            let path = ask_valid(&mut ask, "Record file", "~/cat-score-records.tsv", |v| {
                if v.trim().is_empty() {
                    Err("path is required".to_string())
                } else {
                    Ok(())
                }
            })?;
            SinkConfig::file(PathBuf::from(path.trim()))
        } else {
            let key = ask_valid(&mut ask, "Spreadsheet id", "", |v| {
                if v.trim().is_empty() {
                    Err("spreadsheet id is required".to_string())
                } else {
                    Ok(())
                }
            })?;
            let range = ask("Sheet or range to append to", DEFAULT_SHEETS_RANGE)?;
            let timeout = ask_valid(&mut ask, "Request timeout", "10s", |v| {
                parse_timeout(v).map(|_| ()).map_err(|e| e.to_string())
            })?;

            let mut sink = SinkConfig::sheets(key.trim());
            sink.range = Some(range).filter(|r| r != DEFAULT_SHEETS_RANGE);
            sink.timeout = Some(timeout).filter(|t| t != "10s");
            sink
        };

        if let Err(errors) = validate_sink(&sink) {
            anyhow::bail!("Sink settings are invalid: {}", errors.join("; "));
        }
        Some(sink)
    } else {
        None
    };

    Ok(Config { report, sink })
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("cat-score Configuration Wizard");
    println!("==============================");
    println!();
    typewriter("Reports are always written to disk. A sink additionally keeps one row per score.");
    println!();

    let config = build_config_with(prompt_with_default, prompt_yes_no)?;

    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    if config.sink.as_ref().is_some_and(|s| s.kind == SinkKind::Sheets) {
        println!("Run `cat-score auth` to store your Sheets access token.");
    }

    Ok(())
}
