use std::fmt;

use serde::{Deserialize, Serialize};

/// CEFR proficiency band for a TBI final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    C1,
    B2,
    B1,
    A2,
    Unclassified,
}

/// Inclusive ranges checked in order; the first match wins.
const BANDS: [(i64, i64, Band); 4] = [
    (627, 677, Band::C1),
    (543, 626, Band::B2),
    (460, 542, Band::B1),
    (310, 459, Band::A2),
];

impl Band {
    /// Full label as printed on the report and stored in the row
    pub fn label(self) -> &'static str {
        match self {
            Band::C1 => "C1 : Effective Operational Proficiency / Advanced (Proficient User)",
            Band::B2 => "B2 : Vantage / Upper Intermediate (Independent User)",
            Band::B1 => "B1 : Threshold/Intermediate (Independent User)",
            Band::A2 => "A2: Waystage / Elementary (Basic User)",
            Band::Unclassified => "Score is outside every defined band",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Band::C1 => "C1",
            Band::B2 => "B2",
            Band::B1 => "B1",
            Band::A2 => "A2",
            Band::Unclassified => "-",
        }
    }

    /// Inverse of [`Band::label`], used when re-reading persisted rows.
    pub fn from_label(label: &str) -> Option<Self> {
        [Band::C1, Band::B2, Band::B1, Band::A2, Band::Unclassified]
            .into_iter()
            .find(|band| band.label() == label.trim())
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a final score. The score is rounded half-to-even to a whole number first.
pub fn classify(final_score: f64) -> Band {
    if !final_score.is_finite() {
        return Band::Unclassified;
    }
    classify_whole(final_score.round_ties_even() as i64)
}

pub fn classify_whole(score: i64) -> Band {
    BANDS
        .iter()
        .find(|(low, high, _)| score >= *low && score <= *high)
        .map(|(_, _, band)| *band)
        .unwrap_or(Band::Unclassified)
}
