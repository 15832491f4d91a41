use anyhow::Result;

use crate::report::ScoreRecord;
use crate::sink::FileSink;

/// Records read back from a file sink.
#[derive(Debug, Default)]
pub struct History {
    /// Newest first
    pub records: Vec<ScoreRecord>,
    /// Lines that could not be parsed as records
    pub skipped: usize,
}

/// Load at most `limit` records from the sink's file, newest first.
///
/// Unreadable lines are skipped with a warning rather than failing the whole listing.
pub async fn load_history(sink: &FileSink, limit: usize) -> Result<History> {
    let rows = sink.read_rows().await?;

    let mut history = History::default();
    for (line, row) in rows.iter().enumerate() {
        match ScoreRecord::from_row(row) {
            Ok(record) => history.records.push(record),
            Err(e) => {
                tracing::warn!(line = line + 1, error = %e, "skipping unreadable record");
                history.skipped += 1;
            }
        }
    }

    // Stable sort keeps file order for equal timestamps; reverse puts newest first.
    history.records.sort_by_key(|r| r.timestamp);
    history.records.reverse();
    history.records.truncate(limit);

    Ok(history)
}
