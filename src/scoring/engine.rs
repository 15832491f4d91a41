use super::band::{classify, Band};
use super::tables::table_for;
use super::validation::Submission;
use super::{Subject, TestKind};
use crate::error::{Result, ScoreError};

/// One subject's contribution to the final score.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectScore {
    pub subject: Subject,
    pub raw: f64,
    /// Table-converted value (TBI only)
    pub converted: Option<u32>,
}

/// Result of scoring one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub test: TestKind,
    pub subjects: Vec<SubjectScore>,
    /// Unrounded final score
    pub final_score: f64,
    /// Band of the final score (TBI only)
    pub band: Option<Band>,
}

impl Conversion {
    /// Final score rounded for display and storage
    pub fn final_rounded(&self) -> f64 {
        round2(self.final_score)
    }

    pub fn converted(&self) -> Option<[u32; 3]> {
        let mut out = [0; 3];
        for (slot, score) in out.iter_mut().zip(&self.subjects) {
            *slot = score.converted?;
        }
        Some(out)
    }
}

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `(mean / 100) * 600 + 200`
pub fn tpa_final(scores: [f64; 3]) -> f64 {
    let mean = scores.iter().sum::<f64>() / 3.0;
    (mean / 100.0) * 600.0 + 200.0
}

/// `(sum / 3) * 10`
pub fn tbi_final(converted: [u32; 3]) -> f64 {
    let sum: u32 = converted.iter().sum();
    f64::from(sum) / 3.0 * 10.0
}

/// Convert one raw score through its subject's table.
pub fn convert_subject(subject: Subject, raw: f64) -> Result<u32> {
    table_for(subject)
        .and_then(|table| table.lookup(raw))
        .ok_or(ScoreError::ConversionLookup {
            subject,
            value: raw,
        })
}

pub fn convert_tpa(scores: [f64; 3]) -> Result<Conversion> {
    let final_score = tpa_final(scores);
    if !final_score.is_finite() {
        return Err(ScoreError::NonFinite { inputs: scores });
    }

    let subjects = TestKind::Tpa
        .subjects()
        .into_iter()
        .zip(scores)
        .map(|(subject, raw)| SubjectScore {
            subject,
            raw,
            converted: None,
        })
        .collect();

    Ok(Conversion {
        test: TestKind::Tpa,
        subjects,
        final_score,
        band: None,
    })
}

pub fn convert_tbi(scores: [f64; 3]) -> Result<Conversion> {
    let mut subjects = Vec::with_capacity(3);
    let mut converted = [0u32; 3];
    for (i, (subject, raw)) in TestKind::Tbi.subjects().into_iter().zip(scores).enumerate() {
        let value = convert_subject(subject, raw)?;
        converted[i] = value;
        subjects.push(SubjectScore {
            subject,
            raw,
            converted: Some(value),
        });
    }

    let final_score = tbi_final(converted);
    Ok(Conversion {
        test: TestKind::Tbi,
        subjects,
        final_score,
        band: Some(classify(final_score)),
    })
}

/// Score a validated submission with the method its test uses.
pub fn convert(submission: &Submission) -> Result<Conversion> {
    match submission.test {
        TestKind::Tpa => convert_tpa(submission.scores),
        TestKind::Tbi => convert_tbi(submission.scores),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tpa_example() {
        let result = convert_tpa([80.0, 70.0, 90.0]).unwrap();
        assert_eq!(result.final_rounded(), 680.0);
        assert!(result.band.is_none());
        assert!(result.converted().is_none());
        assert_eq!(result.subjects[2].subject, Subject::Figural);
        assert_eq!(result.subjects[2].raw, 90.0);
    }

    #[test]
    fn test_tpa_extremes() {
        assert_eq!(tpa_final([0.0, 0.0, 0.0]), 200.0);
        assert_eq!(tpa_final([100.0, 100.0, 100.0]), 800.0);
        // any finite value is accepted, including out-of-range ones
        assert!(convert_tpa([-50.0, 150.0, 1000.0]).is_ok());
    }

    #[test]
    fn test_tpa_monotonic_in_each_input() {
        let base = [40.0, 55.5, 70.0];
        let start = tpa_final(base);
        for i in 0..3 {
            let mut prev = start;
            for step in 1..=20 {
                let mut scores = base;
                scores[i] += step as f64 * 1.5;
                let next = tpa_final(scores);
                assert!(next >= prev, "input {} step {}", i, step);
                prev = next;
            }
        }
    }

    #[test]
    fn test_tpa_rejects_non_finite() {
        let err = convert_tpa([f64::INFINITY, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, ScoreError::NonFinite { .. }));
        assert!(convert_tpa([f64::NAN, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_tbi_example() {
        let result = convert_tbi([50.0, 50.0, 50.0]).unwrap();
        assert_eq!(result.converted(), Some([50, 50, 49]));
        assert_eq!(result.final_rounded(), 496.67);
        assert_eq!(result.band, Some(Band::B1));
    }

    #[test]
    fn test_tbi_extremes() {
        let top = convert_tbi([100.0, 100.0, 100.0]).unwrap();
        assert_eq!(top.converted(), Some([68, 68, 67]));
        assert_eq!(top.final_rounded(), 676.67);
        assert_eq!(top.band, Some(Band::C1));

        let bottom = convert_tbi([0.0, 0.0, 0.0]).unwrap();
        assert_eq!(bottom.final_rounded(), 310.0);
        assert_eq!(bottom.band, Some(Band::A2));
    }

    #[test]
    fn test_tbi_structure_half_steps() {
        let result = convert_tbi([80.0, 82.5, 80.0]).unwrap();
        assert_eq!(result.converted(), Some([61, 62, 60]));
        assert_eq!(result.final_rounded(), 610.0);
        assert_eq!(result.band, Some(Band::B2));
    }

    #[test]
    fn test_tbi_off_grid_fails() {
        let err = convert_tbi([51.0, 50.0, 50.0]).unwrap_err();
        assert_eq!(
            err,
            ScoreError::ConversionLookup {
                subject: Subject::Listening,
                value: 51.0
            }
        );

        let err = convert_tbi([50.0, 51.0, 50.0]).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::ConversionLookup { subject: Subject::Structure, .. }
        ));

        assert!(convert_tbi([50.0, 50.0, 101.0]).is_err());
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let sub = Submission {
            name: "A".to_string(),
            test: TestKind::Tbi,
            scores: [24.0, 37.5, 88.0],
        };
        let first = convert(&sub).unwrap();
        for _ in 0..5 {
            assert_eq!(convert(&sub).unwrap(), first);
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(496.6666666), 496.67);
        assert_eq!(round2(680.0), 680.0);
        assert_eq!(round2(503.3333333), 503.33);
    }
}
