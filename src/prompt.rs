use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Prompt user with a message and return their trimmed input.
/// Fails once stdin is closed, so callers that re-ask cannot spin forever.
pub fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    read_answer(&mut std::io::stdin().lock())
}

/// Read one line; end of input is an error, an empty line is not.
fn read_answer<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .context("Failed to read input")?;
    if read == 0 {
        anyhow::bail!("No input: stdin was closed");
    }
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
pub fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    Ok(or_default(input, default))
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    Ok(parse_yes_no(&input, default_yes))
}

fn or_default(input: String, default: &str) -> String {
    if input.is_empty() {
        default.to_string()
    } else {
        input
    }
}

fn parse_yes_no(input: &str, default_yes: bool) -> bool {
    let input = input.to_lowercase();
    if input.is_empty() {
        default_yes
    } else {
        input == "y" || input == "yes"
    }
}
