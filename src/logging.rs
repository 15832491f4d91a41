use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `CAT_SCORE_LOG=cat_score=debug`
pub const LOG_ENV_VAR: &str = "CAT_SCORE_LOG";

/// Filter used when `CAT_SCORE_LOG` is unset or invalid.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Build the filter: `-v` always wins, otherwise the environment, otherwise `warn`.
pub fn build_filter(verbose: bool, env_value: Option<&str>) -> EnvFilter {
    let default = default_directive(verbose);
    if verbose {
        return EnvFilter::new(default);
    }
    env_value
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// command output. Calling twice is a no-op.
pub fn init(verbose: bool) {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(verbose, env_value.as_deref());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
