use async_trait::async_trait;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

/// Raw response for a fetched document. Status codes follow HTTP even for
/// non-HTTP fetchers so the gallery has one success check.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl FetchedDocument {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        FetchedDocument {
            status: 200,
            status_text: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, status_text: &str) -> Self {
        FetchedDocument {
            status,
            status_text: status_text.to_string(),
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The "document fetch" capability the gallery depends on.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `path`. `Err` means the transport itself failed;
    /// an unsuccessful status is still `Ok`.
    async fn fetch(&self, path: &str) -> Result<FetchedDocument, FetchError>;
}

// ── HTTP ──────────────────────────────────────────────

/// Fetches documents over HTTP relative to a base URL.
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, String> {
        let mut base =
            Url::parse(base_url).map_err(|e| format!("Invalid base URL '{}': {}", base_url, e))?;
        if base.cannot_be_a_base() {
            return Err(format!("Base URL '{}' cannot hold relative paths", base_url));
        }
        // Without a trailing slash `join` would replace the last segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;

        Ok(HttpFetcher { client, base })
    }

    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path)
            .map_err(|e| FetchError(format!("Invalid document path '{}': {}", path, e)))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<FetchedDocument, FetchError> {
        let url = self.resolve(path)?;
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError(format!("Request to {} failed: {}", url, e)))?;

        let status = resp.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError(format!("Reading body from {} failed: {}", url, e)))?;

        Ok(FetchedDocument {
            status: status.as_u16(),
            status_text,
            body: body.to_vec(),
        })
    }
}

// ── Filesystem ────────────────────────────────────────

/// Reads documents from a site root on disk.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileFetcher { root: root.into() }
    }

    /// Map a document path onto the site root. Absolute paths and parent
    /// components are rejected so lookups cannot leave the root.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = Path::new(path.trim_start_matches("./"));
        let contained = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained || path.is_empty() {
            return None;
        }
        Some(self.root.join(rel))
    }
}

#[async_trait]
impl DocumentFetcher for FileFetcher {
    async fn fetch(&self, path: &str) -> Result<FetchedDocument, FetchError> {
        let full = match self.resolve(path) {
            Some(p) => p,
            None => return Ok(FetchedDocument::with_status(403, "Forbidden")),
        };

        match tokio::fs::read(&full).await {
            Ok(body) => Ok(FetchedDocument::ok(body)),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                Ok(FetchedDocument::with_status(404, "Not Found"))
            }
            Err(e) if e.kind() == IoErrorKind::PermissionDenied => {
                Ok(FetchedDocument::with_status(403, "Forbidden"))
            }
            Err(e) => Err(FetchError(format!("Failed to read {}: {}", full.display(), e))),
        }
    }
}
