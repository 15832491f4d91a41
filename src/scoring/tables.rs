use std::sync::LazyLock;

use super::Subject;

/// Converted scores for raw listening scores 0, 2, 4, ..., 100
const LISTENING: [u32; 51] = [
    31, 32, 32, 33, 34, 35, 35, 36, 37, 38, 38, 39, 40, 41, 41, 42, 43, 44, 44, 45, 46, 47, 47, 48,
    49, 50, 50, 51, 52, 52, 53, 54, 55, 55, 56, 57, 58, 58, 59, 60, 61, 61, 62, 63, 64, 64, 65, 66,
    67, 67, 68,
];

/// Converted scores for raw structure scores 0, 2.5, 5, ..., 100
const STRUCTURE: [u32; 41] = [
    31, 32, 33, 34, 35, 36, 37, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 50, 51, 52,
    53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 62, 63, 64, 65, 66, 67, 68,
];

/// Converted scores for raw reading scores 0, 2, 4, ..., 100
const READING: [u32; 51] = [
    31, 32, 32, 33, 34, 35, 35, 36, 37, 37, 38, 39, 40, 40, 41, 42, 43, 43, 44, 45, 45, 46, 47, 48,
    48, 49, 50, 50, 51, 52, 53, 53, 54, 55, 55, 56, 57, 58, 58, 59, 60, 61, 61, 62, 63, 63, 64, 65,
    66, 66, 67,
];

static LISTENING_TABLE: LazyLock<ConversionTable> =
    LazyLock::new(|| ConversionTable::from_grid(Subject::Listening, 2.0, &LISTENING));
static STRUCTURE_TABLE: LazyLock<ConversionTable> =
    LazyLock::new(|| ConversionTable::from_grid(Subject::Structure, 2.5, &STRUCTURE));
static READING_TABLE: LazyLock<ConversionTable> =
    LazyLock::new(|| ConversionTable::from_grid(Subject::Reading, 2.0, &READING));

/// Exact-match mapping from raw grid scores to converted scores for one subject.
///
/// Keys are `index * step`, which is exact in `f64` for the steps in use (2 and 2.5),
/// so lookups compare with `==` and never interpolate.
#[derive(Debug, Clone)]
pub struct ConversionTable {
    subject: Subject,
    step: f64,
    entries: Vec<(f64, u32)>,
}

impl ConversionTable {
    fn from_grid(subject: Subject, step: f64, converted: &[u32]) -> Self {
        let entries = converted
            .iter()
            .enumerate()
            .map(|(i, &value)| (i as f64 * step, value))
            .collect();
        Self {
            subject,
            step,
            entries,
        }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn min(&self) -> f64 {
        self.entries.first().map(|(k, _)| *k).unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.entries.last().map(|(k, _)| *k).unwrap_or(0.0)
    }

    /// Grid entries in ascending raw-score order
    pub fn entries(&self) -> &[(f64, u32)] {
        &self.entries
    }

    /// Look up a raw score. Only values equal to a grid key match.
    pub fn lookup(&self, raw: f64) -> Option<u32> {
        self.entries
            .iter()
            .find(|(key, _)| *key == raw)
            .map(|(_, converted)| *converted)
    }
}

/// Conversion table for a table-converted subject; `None` for formula-scored subjects.
pub fn table_for(subject: Subject) -> Option<&'static ConversionTable> {
    match subject {
        Subject::Listening => Some(&*LISTENING_TABLE),
        Subject::Structure => Some(&*STRUCTURE_TABLE),
        Subject::Reading => Some(&*READING_TABLE),
        Subject::Verbal | Subject::Numerical | Subject::Figural => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(subject: Subject) -> &'static ConversionTable {
        table_for(subject).unwrap()
    }

    #[test]
    fn test_grid_shapes() {
        assert_eq!(table(Subject::Listening).entries().len(), 51);
        assert_eq!(table(Subject::Structure).entries().len(), 41);
        assert_eq!(table(Subject::Reading).entries().len(), 51);
        for subject in [Subject::Listening, Subject::Structure, Subject::Reading] {
            assert_eq!(table(subject).min(), 0.0);
            assert_eq!(table(subject).max(), 100.0);
        }
    }

    #[test]
    fn test_every_grid_key_converts_to_tabled_value() {
        for (subject, values) in [
            (Subject::Listening, &LISTENING[..]),
            (Subject::Structure, &STRUCTURE[..]),
            (Subject::Reading, &READING[..]),
        ] {
            let t = table(subject);
            for (i, expected) in values.iter().enumerate() {
                let key = i as f64 * t.step();
                assert_eq!(t.lookup(key), Some(*expected), "{} {}", subject, key);
            }
        }
    }

    #[test]
    fn test_known_entries() {
        assert_eq!(table(Subject::Listening).lookup(50.0), Some(50));
        assert_eq!(table(Subject::Structure).lookup(50.0), Some(50));
        assert_eq!(table(Subject::Reading).lookup(50.0), Some(49));
        assert_eq!(table(Subject::Structure).lookup(97.5), Some(67));
        assert_eq!(table(Subject::Listening).lookup(100.0), Some(68));
        assert_eq!(table(Subject::Reading).lookup(0.0), Some(31));
    }

    #[test]
    fn test_off_grid_values_miss() {
        assert_eq!(table(Subject::Listening).lookup(51.0), None);
        assert_eq!(table(Subject::Listening).lookup(2.5), None);
        assert_eq!(table(Subject::Structure).lookup(2.0), None);
        assert_eq!(table(Subject::Reading).lookup(102.0), None);
        assert_eq!(table(Subject::Reading).lookup(-2.0), None);
        assert_eq!(table(Subject::Reading).lookup(f64::NAN), None);
        // 0.1 + 0.2 style representation error must not match a key
        assert_eq!(table(Subject::Structure).lookup(2.5000000000000004), None);
    }

    #[test]
    fn test_formula_subjects_have_no_table() {
        assert!(table_for(Subject::Verbal).is_none());
        assert!(table_for(Subject::Numerical).is_none());
        assert!(table_for(Subject::Figural).is_none());
    }
}
