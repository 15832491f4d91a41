use std::future::Future;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::error::ScoreError;
use crate::report::{render_report, write_report, ReportOptions, ScoreRecord};
use crate::scoring::{convert, validate_submission, RawSubmission};
use crate::sink::{RecordSink, SinkError};

/// What happened to the record after the report was written.
#[derive(Debug, Clone, PartialEq)]
pub enum Persistence {
    /// Appended to the sink
    Saved { target: String },
    /// The sink was reached but the append failed
    Failed { target: String, error: SinkError },
    /// No sink available, report only
    NotConnected { reason: String },
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub record: ScoreRecord,
    pub report_path: PathBuf,
    pub persistence: Persistence,
}

/// Why a submission produced no report.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("failed to write report: {0:#}")]
    Report(anyhow::Error),
}

/// Run one submission through the whole pipeline:
/// validate, convert, build the record, write the report, then append the row once.
///
/// `connect` is awaited only after the report is on disk.
/// Scoring errors stop before anything is written. A sink failure is reported in
/// the outcome and never undoes the report.
pub async fn submit<C, S>(
    raw: &RawSubmission,
    options: &ReportOptions,
    report_dir: &Path,
    connect: C,
) -> Result<SubmitOutcome, SubmitError>
where
    C: Future<Output = Result<S, SinkError>>,
    S: Deref,
    S::Target: RecordSink,
{
    let submission = validate_submission(raw)?;
    let conversion = convert(&submission)?;
    tracing::debug!(
        test = %submission.test,
        final_score = conversion.final_score,
        band = ?conversion.band,
        "submission converted"
    );

    let record = ScoreRecord::new(&submission, &conversion);
    let page = render_report(&record, options);
    let report_path = write_report(report_dir, &record, &page).map_err(SubmitError::Report)?;
    tracing::info!(path = %report_path.display(), id = %record.id, "report written");

    let persistence = match connect.await {
        Ok(sink) => {
            let target = sink.describe();
            match sink.append(&record.to_row()).await {
                Ok(()) => {
                    tracing::info!(%target, id = %record.id, "record appended");
                    Persistence::Saved { target }
                }
                Err(error) => {
                    tracing::warn!(%target, %error, "record not saved");
                    Persistence::Failed { target, error }
                }
            }
        }
        Err(error) => {
            tracing::debug!(reason = %error, "continuing without a sink");
            Persistence::NotConnected {
                reason: error.to_string(),
            }
        }
    };

    Ok(SubmitOutcome {
        record,
        report_path,
        persistence,
    })
}
