pub mod file;
#[cfg(test)]
pub(crate) mod memory;
pub mod sheets;

pub use file::FileSink;
#[cfg(test)]
pub(crate) use memory::MemorySink;
pub use sheets::SheetsSink;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{self, SinkConfig, SinkKind};
use crate::report::Cell;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SinkError {
    /// No usable sink could be built from configuration or credentials.
    #[error("not connected: {0}")]
    NotConfigured(String),
    /// The store could not be reached in time.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The store answered but refused the row.
    #[error("write rejected: {0}")]
    Write(String),
}

/// Append-only destination for score rows.
///
/// Implementations must not assume ids are unique and must fail in bounded
/// time. Callers make one attempt per record.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Short human-readable target, e.g. "Google Sheet abc123 (Sheet1)"
    fn describe(&self) -> String;

    async fn append(&self, row: &[Cell]) -> Result<(), SinkError>;
}

/// Build the configured sink.
///
/// Every problem (missing section, invalid fields, missing token) becomes
/// `SinkError::NotConfigured`, so callers can carry on without persistence.
/// The keyring lookup for a Sheets token is bounded by the sink timeout.
pub async fn build_sink(sink: Option<&SinkConfig>) -> Result<Box<dyn RecordSink>, SinkError> {
    let sink = sink.ok_or_else(|| SinkError::NotConfigured("no sink configured".to_string()))?;

    if let Err(errors) = config::validate_sink(sink) {
        return Err(SinkError::NotConfigured(errors.join("; ")));
    }

    match sink.kind {
        SinkKind::File => {
            let path = sink.path.as_deref().ok_or_else(|| {
                SinkError::NotConfigured("sink.path: required for kind 'file'".to_string())
            })?;
            Ok(Box::new(FileSink::new(config::expand_home(path))))
        }
        SinkKind::Sheets => {
            let limit = sheets::request_timeout(sink)?;
            let token = crate::credentials::resolve_token_within(limit)
                .await
                .map_err(|e| SinkError::NotConfigured(e.to_string()))?;
            Ok(Box::new(SheetsSink::from_config(sink, token)?))
        }
    }
}
