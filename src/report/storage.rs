use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::record::ScoreRecord;

/// File name for a record's printable page, e.g. `tbi-report-<uid>.txt`
pub fn report_file_name(record: &ScoreRecord) -> String {
    format!(
        "{}-report-{}.txt",
        record.test.tag().to_lowercase(),
        record.id
    )
}

/// Write the printable page atomically into `dir` and return its path.
///
/// Creates `dir` if it doesn't exist. The file is never left half-written.
pub fn write_report(dir: &Path, record: &ScoreRecord, page: &str) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory at {}", dir.display()))?;
    }

    let path = dir.join(report_file_name(record));
    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(page.as_bytes())
        .context("Failed to write report")?;

    file.commit()
        .with_context(|| format!("Failed to save report to {}", path.display()))?;

    Ok(path)
}
