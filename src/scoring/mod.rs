pub mod band;
pub mod engine;
pub mod tables;
pub mod validation;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use band::{classify, Band};
pub use engine::{convert, round2, Conversion, SubjectScore};
pub use tables::{table_for, ConversionTable};
pub use validation::{parse_score, validate_submission, RawSubmission, Submission};

/// The two practice tests the tool scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestKind {
    /// Academic potential test, scored by direct formula
    Tpa,
    /// English proficiency test, scored by table lookup
    Tbi,
}

impl TestKind {
    /// Tag written to the persisted row ("TPA" / "TBI")
    pub fn tag(self) -> &'static str {
        match self {
            TestKind::Tpa => "TPA",
            TestKind::Tbi => "TBI",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "TPA" => Some(TestKind::Tpa),
            "TBI" => Some(TestKind::Tbi),
            _ => None,
        }
    }

    /// Subjects in form and row order
    pub fn subjects(self) -> [Subject; 3] {
        match self {
            TestKind::Tpa => [Subject::Verbal, Subject::Numerical, Subject::Figural],
            TestKind::Tbi => [Subject::Listening, Subject::Structure, Subject::Reading],
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Verbal,
    Numerical,
    Figural,
    Listening,
    Structure,
    Reading,
}

impl Subject {
    pub fn label(self) -> &'static str {
        match self {
            Subject::Verbal => "Verbal",
            Subject::Numerical => "Numerical",
            Subject::Figural => "Figural",
            Subject::Listening => "Listening",
            Subject::Structure => "Structure",
            Subject::Reading => "Reading",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
