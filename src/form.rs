use anyhow::Result;

use crate::prompt::prompt_with_default;
use crate::scoring::{RawSubmission, TestKind};

/// Default shown for a subscore the user hasn't typed yet
pub const DEFAULT_SUBSCORE: &str = "0";

/// Values supplied up front (e.g. from command-line flags). Missing ones are asked for.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub name: Option<String>,
    pub subscores: [Option<String>; 3],
}

/// Fill a form for `test`, asking on stdin only for fields not already given.
pub fn collect(test: TestKind, input: FormInput) -> Result<RawSubmission> {
    collect_with(test, input, |label, default| prompt_with_default(label, default))
}

/// Same as [`collect`] with a caller-supplied prompt, so the form can be driven
/// without a terminal.
pub fn collect_with<F>(test: TestKind, input: FormInput, mut ask: F) -> Result<RawSubmission>
where
    F: FnMut(&str, &str) -> Result<String>,
{
    let name = match input.name {
        Some(name) => name,
        None => ask("Name", "")?,
    };

    let subjects = test.subjects();
    let mut subscores: [String; 3] = Default::default();
    for ((slot, given), subject) in subscores.iter_mut().zip(input.subscores).zip(subjects) {
        *slot = match given {
            Some(value) => value,
            None => ask(&format!("{} score", subject.label()), DEFAULT_SUBSCORE)?,
        };
    }

    Ok(RawSubmission {
        name,
        test,
        subscores,
    })
}
