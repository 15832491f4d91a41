use anyhow::{Context, Result};

use super::store_token;

/// Prompts user to enter a Google Sheets OAuth access token
pub fn prompt_for_token() -> Result<String> {
    println!("Google Sheets access token required.");
    println!("The token needs the https://www.googleapis.com/auth/spreadsheets scope.");
    println!();

    let token = rpassword::prompt_password("Enter token: ")
        .context("Failed to read token from stdin")?;

    let token = token.trim();

    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    Ok(token.to_string())
}

/// Prompt for a token and store it in the keyring, replacing any existing one
pub async fn setup_token() -> Result<()> {
    let token = prompt_for_token()?;

    store_token(token)
        .await
        .context("Failed to store token in keyring")?;

    println!("Token stored securely in system keyring.");

    Ok(())
}
