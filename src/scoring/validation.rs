use super::{Subject, TestKind};
use crate::error::{Result, ScoreError};

/// A form submission as typed: name plus one raw string per subject.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSubmission {
    pub name: String,
    pub test: TestKind,
    /// Raw strings in `test.subjects()` order
    pub subscores: [String; 3],
}

/// A submission whose subscores all parsed as numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub test: TestKind,
    pub scores: [f64; 3],
}

/// Parse one subscore. Surrounding whitespace is ignored; no bounds are checked here.
pub fn parse_score(subject: Subject, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ScoreError::InvalidInput {
            subject,
            raw: raw.to_string(),
        })
}

/// Parse every subscore, stopping at the first one that is not a number.
/// The name is carried through untouched, even when empty.
pub fn validate_submission(raw: &RawSubmission) -> Result<Submission> {
    let subjects = raw.test.subjects();
    let mut scores = [0.0; 3];
    for (slot, (subject, text)) in scores.iter_mut().zip(subjects.iter().zip(&raw.subscores)) {
        *slot = parse_score(*subject, text)?;
    }

    Ok(Submission {
        name: raw.name.clone(),
        test: raw.test,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(test: TestKind, a: &str, b: &str, c: &str) -> RawSubmission {
        RawSubmission {
            name: "Siti".to_string(),
            test,
            subscores: [a.to_string(), b.to_string(), c.to_string()],
        }
    }

    #[test]
    fn test_parses_integers_and_decimals() {
        let sub = validate_submission(&raw(TestKind::Tbi, "50", " 47.5 ", "0")).unwrap();
        assert_eq!(sub.scores, [50.0, 47.5, 0.0]);
        assert_eq!(sub.name, "Siti");
    }

    #[test]
    fn test_no_bounds_at_this_stage() {
        let sub = validate_submission(&raw(TestKind::Tpa, "-10", "250", "1e2")).unwrap();
        assert_eq!(sub.scores, [-10.0, 250.0, 100.0]);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = validate_submission(&raw(TestKind::Tpa, "80", "seventy", "90")).unwrap_err();
        assert_eq!(
            err,
            ScoreError::InvalidInput {
                subject: Subject::Numerical,
                raw: "seventy".to_string()
            }
        );
    }

    #[test]
    fn test_first_failure_reported() {
        let err = validate_submission(&raw(TestKind::Tbi, "x", "", "y")).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::InvalidInput { subject: Subject::Listening, .. }
        ));
    }

    #[test]
    fn test_empty_string_is_invalid() {
        assert!(parse_score(Subject::Reading, "").is_err());
        assert!(parse_score(Subject::Reading, "   ").is_err());
    }

    #[test]
    fn test_empty_name_allowed() {
        let mut submission = raw(TestKind::Tpa, "1", "2", "3");
        submission.name = String::new();
        assert_eq!(validate_submission(&submission).unwrap().name, "");
    }
}
