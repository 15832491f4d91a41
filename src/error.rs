use thiserror::Error;

use crate::scoring::Subject;

/// Failures that end a submission before any report or record exists.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    /// A subscore string did not parse as a number.
    #[error("{subject} score '{raw}' is not a number")]
    InvalidInput { subject: Subject, raw: String },

    /// A parsed subscore has no exact entry in its conversion table.
    #[error("{subject} score {value} has no conversion entry; {}", grid_hint(.subject))]
    ConversionLookup { subject: Subject, value: f64 },

    /// The direct formula produced an infinite or NaN result.
    #[error("final score is not a finite number (inputs: {inputs:?})")]
    NonFinite { inputs: [f64; 3] },
}

pub type Result<T> = std::result::Result<T, ScoreError>;

fn grid_hint(subject: &Subject) -> String {
    match crate::scoring::tables::table_for(*subject) {
        Some(table) => format!(
            "valid values are {} to {} in steps of {}",
            table.min(),
            table.max(),
            table.step()
        ),
        None => "this subject is not table-converted".to_string(),
    }
}
