//! HTTP client for the upload service
//!
//! Two endpoints are consumed: `POST /upload-document/` (multipart, one file
//! part named `file`) and `GET /files/` (JSON list of [`FileRecord`]).

use std::path::Path;
use std::time::Duration;

use reqwest::{multipart, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::core::config::ApiConfig;
use crate::core::record::FileRecord;

const UPLOAD_PATH: &str = "/upload-document/";
const FILES_PATH: &str = "/files/";
const USER_AGENT: &str = concat!("optiextract/", env!("CARGO_PKG_VERSION"));

/// Shown when the server rejects an upload without saying why
pub const UPLOAD_FAILED_FALLBACK: &str = "File upload failed";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("could not reach server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("request was interrupted")]
    Lost,
}

impl ApiError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }
}

/// Error body the server sends with a failed request
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Client bound to one service base address
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload one file.
    ///
    /// Any 2xx status counts as success; the record the server created is
    /// returned when the body describes one.
    pub async fn upload_document(&self, path: &Path) -> Result<Option<FileRecord>, ApiError> {
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let contents = tokio::fs::read(path).await?;
        let size = contents.len();

        let part = multipart::Part::bytes(contents)
            .file_name(file_name.clone())
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new().part("file", part);

        tracing::info!("Uploading {} ({} bytes)", file_name, size);
        let response = self
            .http
            .post(self.endpoint(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let detail = rejection_detail(&body);
            tracing::warn!("Upload of {} rejected ({}): {}", file_name, status, detail);
            return Err(ApiError::Rejected { status, detail });
        }

        match serde_json::from_slice::<FileRecord>(&body) {
            Ok(record) => {
                tracing::info!(
                    "Upload accepted: id={} stored as {}",
                    record.id,
                    record.system_filename.as_deref().unwrap_or("?")
                );
                Ok(Some(record))
            }
            Err(e) => {
                tracing::debug!("Upload accepted ({}) without a file record: {}", status, e);
                Ok(None)
            }
        }
    }

    /// Fetch the upload history in server order
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, ApiError> {
        let response = self.http.get(self.endpoint(FILES_PATH)).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Listing files failed with status {}", status);
            return Err(ApiError::Rejected {
                status,
                detail: "Failed to fetch files.".to_string(),
            });
        }

        let body = response.bytes().await?;
        let records: Vec<FileRecord> = serde_json::from_slice(&body)?;
        tracing::info!("Fetched {} file records", records.len());
        Ok(records)
    }
}

/// Pull the `detail` message out of an error body, or fall back
fn rejection_detail(body: &[u8]) -> String {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);

    match detail {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
        // Validation failures carry a list of issues instead of a string
        Some(serde_json::Value::Array(items)) if !items.is_empty() => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => UPLOAD_FAILED_FALLBACK.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// A request as seen by the test server
    struct Captured {
        head: String,
        body: Vec<u8>,
    }

    /// Serve exactly one request with a canned response
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                assert!(n > 0, "connection closed before headers");
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            let _ = tx.send(Captured {
                head,
                body: buf[header_end..].to_vec(),
            });
        });

        (format!("http://{}", addr), rx)
    }

    fn client_for(base_url: String) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url,
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    fn temp_upload(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("optiextract-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client_for("http://127.0.0.1:8000/".to_string());
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.endpoint(FILES_PATH), "http://127.0.0.1:8000/files/");
    }

    #[test]
    fn test_rejection_detail() {
        assert_eq!(
            rejection_detail(br#"{"detail":"There was an error uploading the file."}"#),
            "There was an error uploading the file."
        );
        assert_eq!(
            rejection_detail(br#"{"detail":[{"loc":["body","file"],"msg":"Field required"}]}"#),
            "Field required"
        );
        assert_eq!(rejection_detail(br#"{"detail":""}"#), UPLOAD_FAILED_FALLBACK);
        assert_eq!(rejection_detail(b"<html>502</html>"), UPLOAD_FAILED_FALLBACK);
    }

    #[tokio::test]
    async fn test_list_files() {
        let (base, captured) = serve_once(
            "200 OK",
            r#"[{"id":2,"original_filename":"b.txt","system_filename":"x.txt","file_size_bytes":10,"uploaded_at":"2024-01-02T00:00:00"},
                {"id":1,"original_filename":"a.txt","system_filename":"y.txt","file_size_bytes":0,"uploaded_at":"2024-01-01T00:00:00"}]"#,
        )
        .await;

        let records = client_for(base).list_files().await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r.original_filename.as_str()).collect();
        assert_eq!(names, ["b.txt", "a.txt"]);

        let captured = captured.await.unwrap();
        assert!(captured.head.starts_with("GET /files/ HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_list_files_error_status() {
        let (base, _captured) =
            serve_once("500 Internal Server Error", r#"{"detail":"Could not retrieve file records."}"#).await;

        let err = client_for(base).list_files().await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_upload_document_sends_file_part() {
        let (base, captured) = serve_once(
            "200 OK",
            r#"{"id":5,"original_filename":"notes.txt","system_filename":"abc.txt","file_size_bytes":11,"uploaded_at":"2024-01-01T00:00:00"}"#,
        )
        .await;
        let path = temp_upload("notes.txt", b"hello world");

        let record = client_for(base).upload_document(&path).await.unwrap().unwrap();
        assert_eq!(record.id, 5);
        assert_eq!(record.file_size_bytes, 11);

        let captured = captured.await.unwrap();
        assert!(captured.head.starts_with("POST /upload-document/ HTTP/1.1"));
        assert!(captured.head.to_ascii_lowercase().contains("multipart/form-data"));
        let body = String::from_utf8_lossy(&captured.body);
        assert!(body.contains(r#"name="file""#));
        assert!(body.contains(r#"filename="notes.txt""#));
        assert!(body.contains("hello world"));
    }

    #[tokio::test]
    async fn test_upload_success_without_record_body() {
        let (base, _captured) = serve_once("200 OK", r#"{"message":"stored"}"#).await;
        let path = temp_upload("stored.txt", b"data");

        let result = client_for(base).upload_document(&path).await;
        assert!(matches!(result, Ok(None)), "2xx must count as success: {:?}", result);
    }

    #[tokio::test]
    async fn test_upload_rejection_uses_detail() {
        let (base, _captured) = serve_once(
            "500 Internal Server Error",
            r#"{"detail":"There was an error uploading the file."}"#,
        )
        .await;
        let path = temp_upload("rejected.txt", b"data");

        let err = client_for(base).upload_document(&path).await.unwrap_err();
        assert_eq!(err.to_string(), "There was an error uploading the file.");
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let client = client_for("http://127.0.0.1:9".to_string());
        let err = client
            .upload_document(Path::new("/definitely/not/here.bin"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }
}
