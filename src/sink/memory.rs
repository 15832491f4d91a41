use async_trait::async_trait;
use std::sync::Mutex;

use super::{RecordSink, SinkError};
use crate::report::Cell;

/// In-process sink that keeps rows in memory. Can be set to reject every write.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<Vec<Cell>>>,
    failure: Option<SinkError>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every append fails with `error`
    pub fn failing(error: SinkError) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.rows
            .lock()
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    fn describe(&self) -> String {
        "in-memory sink".to_string()
    }

    async fn append(&self, row: &[Cell]) -> Result<(), SinkError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".to_string()))?;
        rows.push(row.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_appends_in_order() {
        let sink = MemorySink::new();
        sink.append(&[Cell::Integer(1)]).await.unwrap();
        sink.append(&[Cell::Integer(2)]).await.unwrap();
        assert_eq!(sink.rows(), vec![vec![Cell::Integer(1)], vec![Cell::Integer(2)]]);
    }

    #[tokio::test]
    async fn test_failing_sink_keeps_nothing() {
        let sink = MemorySink::failing(SinkError::Unavailable("down".to_string()));
        let err = sink.append(&[Cell::Integer(1)]).await.unwrap_err();
        assert_eq!(err, SinkError::Unavailable("down".to_string()));
        assert!(sink.rows().is_empty());
    }
}
