use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use cat_score::config::{self, Config, SinkKind};
use cat_score::form::{self, FormInput};
use cat_score::output;
use cat_score::report::ReportOptions;
use cat_score::scoring::{table_for, Subject, TestKind};
use cat_score::sink::{self, FileSink};
use cat_score::submit::{self, SubmitError};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_AUTH: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score an academic potential test (TPA) by direct formula
    Tpa {
        /// Candidate name (prompted if omitted)
        #[arg(long)]
        name: Option<String>,
        /// Verbal raw score
        #[arg(long, allow_hyphen_values = true)]
        verbal: Option<String>,
        /// Numerical raw score
        #[arg(long, allow_hyphen_values = true)]
        numerical: Option<String>,
        /// Figural raw score
        #[arg(long, allow_hyphen_values = true)]
        figural: Option<String>,
    },
    /// Score an English proficiency test (TBI) by table lookup
    Tbi {
        /// Candidate name (prompted if omitted)
        #[arg(long)]
        name: Option<String>,
        /// Listening raw score (0-100, step 2)
        #[arg(long, allow_hyphen_values = true)]
        listening: Option<String>,
        /// Structure raw score (0-100, step 2.5)
        #[arg(long, allow_hyphen_values = true)]
        structure: Option<String>,
        /// Reading raw score (0-100, step 2)
        #[arg(long, allow_hyphen_values = true)]
        reading: Option<String>,
    },
    /// Show the TBI conversion tables
    Tables {
        /// Only this subject
        #[arg(long, value_enum)]
        subject: Option<Subject>,
    },
    /// List records saved by the file sink, newest first
    History {
        /// Maximum number of records
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Tab-separated output for scripting
        #[arg(long, conflicts_with = "json")]
        tsv: bool,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
    /// Store a Google Sheets access token in the system keyring
    Auth,
    /// Show configuration and sink status (no network)
    Status,
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "cat-score")]
#[command(about = "CAT practice test score conversion", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/cat-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let cli = Cli::parse();
    cat_score::logging::init(cli.verbose);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // Commands that don't need a loaded config
    match &cli.command {
        Commands::Init => {
            if let Err(e) = config::init::run_init_wizard(config_path) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Auth => {
            if let Err(e) = cat_score::credentials::setup_token().await {
                eprintln!("Credential error: {:#}", e);
                std::process::exit(EXIT_AUTH);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Tables { subject } => {
            print_tables(*subject);
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config = match config::load_config(config_path.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = output::should_use_colors();

    let code = match cli.command {
        Commands::Tpa {
            name,
            verbal,
            numerical,
            figural,
        } => {
            let input = FormInput {
                name,
                subscores: [verbal, numerical, figural],
            };
            run_submission(TestKind::Tpa, input, &config, use_colors).await
        }
        Commands::Tbi {
            name,
            listening,
            structure,
            reading,
        } => {
            let input = FormInput {
                name,
                subscores: [listening, structure, reading],
            };
            run_submission(TestKind::Tbi, input, &config, use_colors).await
        }
        Commands::History { limit, tsv, json } => {
            run_history(&config, limit, tsv, json, use_colors).await
        }
        Commands::Status => run_status(&config, config_path, use_colors).await,
        Commands::Init | Commands::Auth | Commands::Tables { .. } => EXIT_SUCCESS,
    };

    if cli.verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }

    std::process::exit(code);
}

async fn run_submission(test: TestKind, input: FormInput, config: &Config, use_colors: bool) -> i32 {
    let raw = match form::collect(test, input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to read form: {:#}", e);
            return EXIT_INPUT;
        }
    };

    let options = ReportOptions::from_config(&config.report);
    let report_dir = config::report_dir(&config.report);

    // Not awaited until the report is on disk.
    let connect = sink::build_sink(config.sink.as_ref());

    match submit::submit(&raw, &options, &report_dir, connect).await {
        Ok(outcome) => {
            println!("{}", output::format_result(&outcome.record, use_colors));
            println!();
            println!(
                "{}",
                output::success(
                    &format!("Report written to {}", outcome.report_path.display()),
                    use_colors
                )
            );
            println!("{}", output::format_persistence(&outcome.persistence, use_colors));
            EXIT_SUCCESS
        }
        Err(SubmitError::Score(e)) => {
            eprintln!("Invalid input: {}", e);
            if test == TestKind::Tbi {
                eprintln!("Run `cat-score tables` to see the accepted values.");
            }
            EXIT_INPUT
        }
        Err(e @ SubmitError::Report(_)) => {
            eprintln!("{}", e);
            EXIT_CONFIG
        }
    }
}

fn print_tables(subject: Option<Subject>) {
    let use_colors = output::should_use_colors();
    let subjects = match subject {
        Some(s) => vec![s],
        None => TestKind::Tbi.subjects().to_vec(),
    };

    let mut printed = 0;
    for subject in subjects {
        match table_for(subject) {
            Some(table) => {
                if printed > 0 {
                    println!();
                }
                println!("{}", output::format_conversion_table(table, 4, use_colors));
                printed += 1;
            }
            None => println!(
                "{} is scored by formula (mean / 100 * 600 + 200); any number is accepted.",
                subject
            ),
        }
    }
}

async fn run_history(config: &Config, limit: usize, tsv: bool, json: bool, use_colors: bool) -> i32 {
    let path = match config.sink.as_ref() {
        Some(sink) if sink.kind == SinkKind::File => sink.path.as_deref().map(config::expand_home),
        _ => None,
    };
    let Some(path) = path else {
        eprintln!("History needs a file sink. Add to your config:");
        eprintln!("  sink:");
        eprintln!("    kind: file");
        eprintln!("    path: \"~/cat-score-records.tsv\"");
        return EXIT_CONFIG;
    };

    let history = match cat_score::history::load_history(&FileSink::new(path), limit).await {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Failed to read history: {:#}", e);
            return EXIT_CONFIG;
        }
    };

    if json {
        match output::format_history_json(&history.records) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("{:#}", e);
                return EXIT_CONFIG;
            }
        }
    } else if tsv {
        let text = output::format_history_tsv(&history.records);
        if !text.is_empty() {
            println!("{}", text);
        }
    } else {
        let now = chrono::Local::now().naive_local();
        println!("{}", output::format_history_table(&history.records, now, use_colors));
    }

    if history.skipped > 0 {
        eprintln!(
            "{}",
            output::warning(
                &format!("{} unreadable line(s) skipped", history.skipped),
                use_colors
            )
        );
    }

    EXIT_SUCCESS
}

async fn run_status(config: &Config, config_path: Option<PathBuf>, use_colors: bool) -> i32 {
    let path = config_path.unwrap_or_else(config::get_config_path);
    if path.exists() {
        println!("Config: {}", path.display());
    } else {
        println!("Config: {} (not found, using defaults)", path.display());
    }
    println!("Reports: {}", config::report_dir(&config.report).display());

    let Some(sink_config) = config.sink.as_ref() else {
        println!(
            "{}",
            output::info("No sink configured: reports only, records are not saved", use_colors)
        );
        return EXIT_SUCCESS;
    };

    if let Err(errors) = config::validate_sink(sink_config) {
        println!("{}", output::warning("Sink config has errors:", use_colors));
        for error in errors {
            println!("  - {}", error);
        }
        return EXIT_CONFIG;
    }

    match sink_config.kind {
        SinkKind::File => match sink::build_sink(Some(sink_config)).await {
            Ok(sink) => println!(
                "{}",
                output::success(&format!("Records go to {}", sink.describe()), use_colors)
            ),
            Err(e) => println!("{}", output::warning(&e.to_string(), use_colors)),
        },
        SinkKind::Sheets => {
            let key = sink_config.sheet_key.as_deref().unwrap_or_default();
            println!("Sink: Google Sheet {}", key);
            let limit = match sink_config.timeout.as_deref().map(config::parse_timeout) {
                Some(Ok(limit)) => limit,
                _ => config::DEFAULT_SINK_TIMEOUT,
            };
            match cat_score::credentials::resolve_token_within(limit).await {
                Ok(_) => println!("{}", output::success("Access token found", use_colors)),
                Err(e) => {
                    println!("{}", output::warning(&e.to_string(), use_colors));
                    return EXIT_AUTH;
                }
            }
        }
    }

    EXIT_SUCCESS
}
