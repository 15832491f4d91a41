use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::scoring::{Band, Conversion, Submission, TestKind};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scalar field of a persisted row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl Cell {
    /// Text form used by the file sink and the printed report
    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(n) => n.to_string(),
            Cell::Number(n) => format_number(*n),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Integer(n) => Some(*n as f64),
            Cell::Number(n) => Some(*n),
        }
    }

    fn as_u32(&self) -> Option<u32> {
        match self {
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Integer(n) => u32::try_from(*n).ok(),
            Cell::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Some(*n as u32),
            Cell::Number(_) => None,
        }
    }
}

/// Whole numbers print without a fractional part ("80"), others as-is ("47.5").
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("row has {found} fields, expected {expected} for {test}")]
    WrongLength {
        test: TestKind,
        expected: usize,
        found: usize,
    },
    #[error("row is empty or has no test tag")]
    MissingTag,
    #[error("unknown test tag '{0}'")]
    UnknownTest(String),
    #[error("field '{field}' has invalid value '{value}'")]
    BadField { field: &'static str, value: String },
}

/// The persisted unit: everything captured about one scored submission.
///
/// Records built from a submission carry both raw and converted inputs. Records
/// re-read from a row only carry what the row stores: raw scores for TPA,
/// converted scores and the band for TBI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub timestamp: NaiveDateTime,
    pub test: TestKind,
    pub name: String,
    pub raw: Option<[f64; 3]>,
    pub converted: Option<[u32; 3]>,
    /// Final score rounded to two decimals
    pub final_score: f64,
    pub band: Option<Band>,
}

impl ScoreRecord {
    /// Build a record with a fresh id, stamped with the current local time.
    pub fn new(submission: &Submission, conversion: &Conversion) -> Self {
        let now = Local::now().naive_local();
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        Self::with_identity(Uuid::new_v4(), timestamp, submission, conversion)
    }

    pub fn with_identity(
        id: Uuid,
        timestamp: NaiveDateTime,
        submission: &Submission,
        conversion: &Conversion,
    ) -> Self {
        Self {
            id,
            timestamp,
            test: submission.test,
            name: submission.name.clone(),
            raw: Some(submission.scores),
            converted: conversion.converted(),
            final_score: conversion.final_rounded(),
            band: conversion.band,
        }
    }

    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// The three per-subject values the row and report show:
    /// raw scores for TPA, converted scores for TBI.
    pub fn subject_cells(&self) -> [Cell; 3] {
        match (self.test, self.converted, self.raw) {
            (TestKind::Tbi, Some(conv), _) => conv.map(|v| Cell::Integer(i64::from(v))),
            (_, _, Some(raw)) => raw.map(Cell::Number),
            _ => [
                Cell::Text(String::new()),
                Cell::Text(String::new()),
                Cell::Text(String::new()),
            ],
        }
    }

    /// Flat ordered field list appended to the sink.
    ///
    /// TPA: `[timestamp, "TPA", name, verbal, numerical, figural, final_score, uid]`
    /// TBI: `[timestamp, "TBI", name, listening, structure, reading, final_score, band, uid]`
    pub fn to_row(&self) -> Vec<Cell> {
        let mut row = vec![
            Cell::Text(self.timestamp_text()),
            Cell::Text(self.test.tag().to_string()),
            Cell::Text(self.name.clone()),
        ];
        row.extend(self.subject_cells());
        row.push(Cell::Number(self.final_score));
        if self.test == TestKind::Tbi {
            let band = self.band.unwrap_or(Band::Unclassified);
            row.push(Cell::Text(band.label().to_string()));
        }
        row.push(Cell::Text(self.id.to_string()));
        row
    }

    /// Re-read a row written by [`ScoreRecord::to_row`].
    pub fn from_row(row: &[Cell]) -> Result<Self, RowError> {
        let tag = row.get(1).ok_or(RowError::MissingTag)?.to_text();
        let test = TestKind::from_tag(&tag).ok_or(RowError::UnknownTest(tag))?;
        let expected = row_len(test);
        if row.len() != expected {
            return Err(RowError::WrongLength {
                test,
                expected,
                found: row.len(),
            });
        }

        let ts_text = row[0].to_text();
        let timestamp = NaiveDateTime::parse_from_str(ts_text.trim(), TIMESTAMP_FORMAT)
            .map_err(|_| bad("timestamp", &row[0]))?;
        let name = row[2].to_text();
        let final_score = row[6].as_f64().ok_or_else(|| bad("final_score", &row[6]))?;
        let id_cell = &row[expected - 1];
        let id = Uuid::parse_str(id_cell.to_text().trim()).map_err(|_| bad("uid", id_cell))?;

        let (raw, converted, band) = match test {
            TestKind::Tpa => {
                let mut raw = [0.0; 3];
                for (i, slot) in raw.iter_mut().enumerate() {
                    let cell = &row[3 + i];
                    *slot = cell.as_f64().ok_or_else(|| bad("subscore", cell))?;
                }
                (Some(raw), None, None)
            }
            TestKind::Tbi => {
                let mut conv = [0u32; 3];
                for (i, slot) in conv.iter_mut().enumerate() {
                    let cell = &row[3 + i];
                    *slot = cell.as_u32().ok_or_else(|| bad("converted", cell))?;
                }
                let band = Band::from_label(&row[7].to_text()).ok_or_else(|| bad("band", &row[7]))?;
                (None, Some(conv), Some(band))
            }
        };

        Ok(Self {
            id,
            timestamp,
            test,
            name,
            raw,
            converted,
            final_score,
            band,
        })
    }
}

fn row_len(test: TestKind) -> usize {
    match test {
        TestKind::Tpa => 8,
        TestKind::Tbi => 9,
    }
}

fn bad(field: &'static str, cell: &Cell) -> RowError {
    RowError::BadField {
        field,
        value: cell.to_text(),
    }
}
