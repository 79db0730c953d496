//! Analysis service client.
//!
//! Fetches detected-KU records over HTTP, or loads the same JSON array
//! from a local file.

use crate::config::ServiceConfig;
use crate::error::FetchError;
use crate::models::AnalysisRecord;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP client for the analysis service.
pub struct ServiceClient {
    base_url: String,
    endpoint: String,
    timeout_seconds: u64,
    retries: usize,
    retry_delay: Duration,
    http_client: reqwest::Client,
}

impl ServiceClient {
    /// Create a client from service settings.
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            endpoint: config.endpoint.clone(),
            timeout_seconds: config.timeout_seconds,
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            http_client,
        })
    }

    /// Full URL of the detected-KU endpoint.
    pub fn records_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }

    /// Fetch all analysis records, retrying transient failures.
    pub async fn fetch_records(&self) -> Result<Vec<AnalysisRecord>, FetchError> {
        let url = self.records_url();
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url).await {
                Ok(records) => {
                    info!("Fetched {} records from {}", records.len(), url);
                    return Ok(records);
                }
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    let delay = self.retry_delay * attempt as u32;
                    warn!(
                        "Fetch attempt {} failed: {}. Retrying in {}ms",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<AnalysisRecord>, FetchError> {
        debug!("GET {}", url);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout_seconds,
                }
            } else if e.is_connect() {
                FetchError::Connect {
                    url: self.base_url.clone(),
                }
            } else {
                FetchError::Request(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        parse_records(&body)
    }
}

/// Decode a JSON array of analysis records.
pub fn parse_records(body: &str) -> Result<Vec<AnalysisRecord>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Load analysis records from a JSON file.
pub async fn load_records_from_file(path: &Path) -> Result<Vec<AnalysisRecord>, FetchError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let records = parse_records(&content)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response per connection, in order.
    async fn spawn_stub(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = socket.read(&mut buf).await.unwrap();
                    request.extend_from_slice(&buf[..n]);
                    if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let reply = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    fn config(base_url: String, retries: usize) -> ServiceConfig {
        ServiceConfig {
            base_url,
            endpoint: "/detected_kus".to_string(),
            timeout_seconds: 5,
            retries,
            retry_delay_ms: 10,
        }
    }

    #[test]
    fn test_records_url_joins_slashes() {
        let mut cfg = config("http://localhost:5000/".to_string(), 0);
        let client = ServiceClient::new(&cfg).unwrap();
        assert_eq!(client.records_url(), "http://localhost:5000/detected_kus");

        cfg.endpoint = "detected_kus".to_string();
        cfg.base_url = "http://localhost:5000".to_string();
        let client = ServiceClient::new(&cfg).unwrap();
        assert_eq!(client.records_url(), "http://localhost:5000/detected_kus");
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        let err = parse_records(r#"{"author": "a"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_records() {
        let base = spawn_stub(vec![(200, r#"[{"author": "a", "kus": {"K1": 1}}]"#)]).await;
        let client = ServiceClient::new(&config(base, 0)).unwrap();

        let records = client.fetch_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author, "a");
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors() {
        let base = spawn_stub(vec![(503, "busy"), (200, "[]")]).await;
        let client = ServiceClient::new(&config(base, 2)).unwrap();

        let records = client.fetch_records().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_client_errors() {
        let base = spawn_stub(vec![(404, "missing")]).await;
        let client = ServiceClient::new(&config(base, 3)).unwrap();

        match client.fetch_records().await {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(body, "missing");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ServiceClient::new(&config(format!("http://{}", addr), 0)).unwrap();
        let err = client.fetch_records().await.unwrap_err();
        assert!(matches!(err, FetchError::Connect { .. }));
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kus.json");
        std::fs::write(&path, r#"[{"author": "b", "kus": {"K2": 2}}]"#).unwrap();

        let records = tokio_test::block_on(load_records_from_file(&path)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author, "b");
    }

    #[test]
    fn test_load_records_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        let err = tokio_test::block_on(load_records_from_file(&path)).unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
