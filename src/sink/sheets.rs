use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;

use super::{RecordSink, SinkError};
use crate::config::{
    self, SinkConfig, DEFAULT_SHEETS_ENDPOINT, DEFAULT_SHEETS_RANGE, DEFAULT_SINK_TIMEOUT,
};
use crate::report::Cell;

/// Appends rows to a Google Sheet through the `values:append` endpoint.
pub struct SheetsSink {
    client: reqwest::Client,
    url: Url,
    sheet_key: String,
    range: String,
    token: String,
}

#[derive(Serialize)]
struct AppendBody<'a> {
    values: [&'a [Cell]; 1],
}

impl SheetsSink {
    pub fn new(
        endpoint: &str,
        sheet_key: &str,
        range: &str,
        token: String,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let url = append_url(endpoint, sheet_key, range)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cat-score/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::NotConfigured(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            sheet_key: sheet_key.to_string(),
            range: range.to_string(),
            token,
        })
    }

    pub fn from_config(sink: &SinkConfig, token: String) -> Result<Self, SinkError> {
        let sheet_key = sink.sheet_key.as_deref().ok_or_else(|| {
            SinkError::NotConfigured("sink.sheet_key: required for kind 'sheets'".to_string())
        })?;
        Self::new(
            sink.endpoint.as_deref().unwrap_or(DEFAULT_SHEETS_ENDPOINT),
            sheet_key,
            sink.range.as_deref().unwrap_or(DEFAULT_SHEETS_RANGE),
            token,
            request_timeout(sink)?,
        )
    }
}

/// Timeout for one request to the sheet, also the bound on the token lookup.
pub(super) fn request_timeout(sink: &SinkConfig) -> Result<Duration, SinkError> {
    match &sink.timeout {
        Some(t) => config::parse_timeout(t)
            .map_err(|e| SinkError::NotConfigured(format!("sink.timeout: {}", e))),
        None => Ok(DEFAULT_SINK_TIMEOUT),
    }
}

/// `{endpoint}/v4/spreadsheets/{key}/values/{range}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS`
fn append_url(endpoint: &str, sheet_key: &str, range: &str) -> Result<Url, SinkError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| SinkError::NotConfigured(format!("invalid endpoint '{}': {}", endpoint, e)))?;

    url.path_segments_mut()
        .map_err(|_| SinkError::NotConfigured(format!("endpoint '{}' cannot be a base URL", endpoint)))?
        .pop_if_empty()
        .extend([
            "v4",
            "spreadsheets",
            sheet_key,
            "values",
            &format!("{}:append", range),
        ]);

    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED")
        .append_pair("insertDataOption", "INSERT_ROWS");

    Ok(url)
}

#[async_trait]
impl RecordSink for SheetsSink {
    fn describe(&self) -> String {
        format!("Google Sheet {} ({})", self.sheet_key, self.range)
    }

    async fn append(&self, row: &[Cell]) -> Result<(), SinkError> {
        let body = AppendBody { values: [row] };

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%status, "row appended to sheet");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(SinkError::Write(format!("HTTP {}: {}", status, text.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve exactly one HTTP request with a canned response, handing back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());
        });

        (format!("http://{}", addr), rx)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn sample_row() -> Vec<Cell> {
        vec![
            Cell::Text("2025-01-01 10:00:00".to_string()),
            Cell::Text("TBI".to_string()),
            Cell::Text("Sari".to_string()),
            Cell::Integer(50),
            Cell::Integer(50),
            Cell::Integer(49),
            Cell::Number(496.67),
            Cell::Text("B1 : Threshold/Intermediate (Independent User)".to_string()),
            Cell::Text("uid".to_string()),
        ]
    }

    #[test]
    fn test_append_url() {
        let url = append_url("https://sheets.googleapis.com", "abc123", "Sheet1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Sheet1:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS"
        );
    }

    #[test]
    fn test_append_url_encodes_range() {
        let url = append_url("https://example.com/", "key", "My Sheet!A1").unwrap();
        assert!(url.path().starts_with("/v4/spreadsheets/key/values/My%20Sheet!A1:append"));
    }

    #[test]
    fn test_append_body_shape() {
        let row = sample_row();
        let body = serde_json::to_value(AppendBody { values: [&row] }).unwrap();
        assert_eq!(body["values"][0][1], "TBI");
        assert_eq!(body["values"][0][3], 50);
        assert_eq!(body["values"][0][6], 496.67);
        assert_eq!(body["values"][0].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_request_timeout_defaults_and_overrides() {
        let mut sink = SinkConfig::sheets("k");
        assert_eq!(request_timeout(&sink).unwrap(), DEFAULT_SINK_TIMEOUT);
        sink.timeout = Some("250ms".to_string());
        assert_eq!(request_timeout(&sink).unwrap(), Duration::from_millis(250));
        sink.timeout = Some("whenever".to_string());
        assert!(matches!(request_timeout(&sink), Err(SinkError::NotConfigured(_))));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            append_url("not a url", "k", "r"),
            Err(SinkError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_append_posts_row_with_bearer_token() {
        let (endpoint, request_rx) = serve_once("200 OK", "{}").await;
        let sink = SheetsSink::new(&endpoint, "sheet-1", "Sheet1", "tok-123".to_string(), Duration::from_secs(5)).unwrap();

        sink.append(&sample_row()).await.unwrap();

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /v4/spreadsheets/sheet-1/values/Sheet1:append?"));
        assert!(request.to_lowercase().contains("authorization: bearer tok-123"));
        assert!(request.contains("\"values\":[["));
        assert!(request.contains("496.67"));
    }

    #[tokio::test]
    async fn test_rejected_write_surfaces_reason() {
        let (endpoint, _rx) = serve_once("403 Forbidden", "{\"error\":\"PERMISSION_DENIED\"}").await;
        let sink = SheetsSink::new(&endpoint, "k", "Sheet1", "t".to_string(), Duration::from_secs(5)).unwrap();

        match sink.append(&sample_row()).await {
            Err(SinkError::Write(reason)) => {
                assert!(reason.contains("403"), "got: {}", reason);
                assert!(reason.contains("PERMISSION_DENIED"), "got: {}", reason);
            }
            other => panic!("expected Write error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = SheetsSink::new(&format!("http://{}", addr), "k", "Sheet1", "t".to_string(), Duration::from_secs(2)).unwrap();
        let err = sink.append(&sample_row()).await.unwrap_err();
        assert!(matches!(err, SinkError::Unavailable(_)), "got {:?}", err);
    }
}
