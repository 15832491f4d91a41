pub mod prompt;

use keyring::Entry;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

const SERVICE_NAME: &str = "cat-score";
const TOKEN_KEY: &str = "sheets-token";

/// Environment variable name for providing a Sheets access token without keyring
pub const ENV_TOKEN_VAR: &str = "CAT_SCORE_SHEETS_TOKEN";

pub use prompt::{prompt_for_token, setup_token};

/// Check for a Sheets token in the CAT_SCORE_SHEETS_TOKEN environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    non_empty(std::env::var(ENV_TOKEN_VAR).ok()?)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Keyring unavailable: {0}")]
    KeyringUnavailable(String),
    #[error("No Sheets token found (set CAT_SCORE_SHEETS_TOKEN or run `cat-score auth`)")]
    TokenNotFound,
    #[error("Failed to store token: {0}")]
    StoreFailed(String),
    #[error("Keyring did not answer within {0}")]
    LookupTimedOut(String),
}

/// Synchronous version of get_token - retrieves token from system keyring
fn get_token_sync() -> Result<String, CredentialError> {
    let entry = Entry::new(SERVICE_NAME, TOKEN_KEY)
        .map_err(|e| CredentialError::KeyringUnavailable(e.to_string()))?;

    entry.get_password().map_err(|e| match e {
        keyring::Error::NoEntry => CredentialError::TokenNotFound,
        _ => CredentialError::KeyringUnavailable(e.to_string()),
    })
}

/// Synchronous version of store_token - stores token in system keyring
fn store_token_sync(token: &str) -> Result<(), CredentialError> {
    let entry = Entry::new(SERVICE_NAME, TOKEN_KEY)
        .map_err(|e| CredentialError::KeyringUnavailable(e.to_string()))?;

    entry
        .set_password(token)
        .map_err(|e| CredentialError::StoreFailed(e.to_string()))
}

/// Retrieve the token from the system keyring without blocking the async runtime
pub async fn get_token() -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(get_token_sync)
        .await
        .map_err(|e| CredentialError::KeyringUnavailable(format!("Task join error: {}", e)))?
}

/// Store the token in the system keyring without blocking the async runtime
pub async fn store_token(token: String) -> Result<(), CredentialError> {
    tokio::task::spawn_blocking(move || store_token_sync(&token))
        .await
        .map_err(|e| CredentialError::KeyringUnavailable(format!("Task join error: {}", e)))?
}

/// Resolve the Sheets token: environment first, then keyring.
pub async fn resolve_token() -> Result<String, CredentialError> {
    if let Some(token) = get_token_from_env() {
        tracing::debug!("using Sheets token from {}", ENV_TOKEN_VAR);
        return Ok(token);
    }
    get_token().await
}

/// Like `resolve_token`, but gives up after `limit`. A keyring that waits on an
/// unlock prompt must not hold up the caller.
pub async fn resolve_token_within(limit: Duration) -> Result<String, CredentialError> {
    within(limit, resolve_token()).await
}

async fn within<T>(
    limit: Duration,
    lookup: impl Future<Output = Result<T, CredentialError>>,
) -> Result<T, CredentialError> {
    tokio::time::timeout(limit, lookup).await.map_err(|_| {
        tracing::warn!(limit = ?limit, "keyring lookup timed out");
        CredentialError::LookupTimedOut(humantime::format_duration(limit).to_string())
    })?
}
