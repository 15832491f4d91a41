use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use super::{RecordSink, SinkError};
use crate::report::Cell;

/// Appends rows as tab-separated lines to a local file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read every stored row back as text cells. A missing file has no rows.
    pub async fn read_rows(&self) -> Result<Vec<Vec<Cell>>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read records from {}", self.path.display()))
            }
        };

        Ok(contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split('\t').map(|f| Cell::Text(f.to_string())).collect())
            .collect())
    }
}

/// One TSV line. Tabs and line breaks inside a cell would break the layout.
fn encode_line(row: &[Cell]) -> String {
    let mut line = row
        .iter()
        .map(|cell| cell.to_text().replace(['\t', '\r', '\n'], " "))
        .collect::<Vec<_>>()
        .join("\t");
    line.push('\n');
    line
}

#[async_trait]
impl RecordSink for FileSink {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn append(&self, row: &[Cell]) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SinkError::Unavailable(format!("{}: {}", self.path.display(), e)))?;

        file.write_all(encode_line(row).as_bytes())
            .await
            .map_err(|e| SinkError::Write(format!("{}: {}", self.path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| SinkError::Write(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), "row appended to file");
        Ok(())
    }
}
