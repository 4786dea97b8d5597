//! Read access to a published translation corpus.
//!
//! A corpus root holds `manifest.json` plus one `<slug>/<chapter>.json`
//! file per non-empty chapter. Sources only hand back raw bytes; parsing
//! and validation belong to the resolver so every backend fails the same
//! way.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

pub const MANIFEST_PATH: &str = "manifest.json";

pub fn chapter_path(slug: &str, chapter: u32) -> String {
    format!("{slug}/{chapter}.json")
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CorpusError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("HTTP {status} for {path}")]
    Status { path: String, status: u16 },

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("network error for {path}: {reason}")]
    Network { path: String, reason: String },
}

/// A place the corpus files can be read from.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Read one file, addressed relative to the translation root.
    async fn read(&self, path: &str) -> Result<Vec<u8>, CorpusError>;
}

/// Corpus laid out in a local directory.
#[derive(Debug, Clone)]
pub struct FsCorpus {
    root: PathBuf,
}

impl FsCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsCorpus { root: root.into() }
    }
}

#[async_trait]
impl CorpusSource for FsCorpus {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, CorpusError> {
        match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CorpusError::NotFound(path.to_string()))
            }
            Err(e) => Err(CorpusError::Io {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Corpus published over HTTP, e.g. as static files next to the web app.
pub struct HttpCorpus {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCorpus {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        HttpCorpus { client, base_url }
    }
}

#[async_trait]
impl CorpusSource for HttpCorpus {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, CorpusError> {
        let url = format!("{}{}", self.base_url, path);
        let network = |e: reqwest::Error| CorpusError::Network {
            path: path.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(network)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CorpusError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(CorpusError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(network)?;
        Ok(bytes.to_vec())
    }
}

/// In-memory corpus that records how often each file was read.
#[derive(Debug, Default)]
pub struct MemoryCorpus {
    files: HashMap<String, Vec<u8>>,
    reads: Mutex<HashMap<String, usize>>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), bytes.into());
        self
    }

    pub fn with_json<T: serde::Serialize>(self, path: impl Into<String>, value: &T) -> Self {
        let bytes = serde_json::to_vec(value).unwrap_or_default();
        self.with_file(path, bytes)
    }

    /// Number of reads issued for `path`, hits and misses alike.
    pub fn reads(&self, path: &str) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl CorpusSource for MemoryCorpus {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, CorpusError> {
        if let Ok(mut reads) = self.reads.lock() {
            *reads.entry(path.to_string()).or_insert(0) += 1;
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CorpusError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_corpus_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("01-Genesis")).unwrap();
        std::fs::write(dir.path().join("01-Genesis/1.json"), br#"["a","b"]"#).unwrap();

        let corpus = FsCorpus::new(dir.path());
        let bytes = corpus.read(&chapter_path("01-Genesis", 1)).await.unwrap();
        assert_eq!(bytes, br#"["a","b"]"#);
    }

    #[tokio::test]
    async fn fs_corpus_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = FsCorpus::new(dir.path());
        let err = corpus.read(MANIFEST_PATH).await.unwrap_err();
        assert_eq!(err, CorpusError::NotFound(MANIFEST_PATH.to_string()));
    }

    #[tokio::test]
    async fn memory_corpus_counts_reads() {
        let corpus = MemoryCorpus::new().with_file("x.json", "[]");
        corpus.read("x.json").await.unwrap();
        corpus.read("x.json").await.unwrap();
        assert!(corpus.read("y.json").await.is_err());
        assert_eq!(corpus.reads("x.json"), 2);
        assert_eq!(corpus.reads("y.json"), 1);
    }

    #[test]
    fn http_corpus_normalizes_base() {
        let corpus = HttpCorpus::new(reqwest::Client::new(), "http://localhost/bible/web");
        assert_eq!(corpus.describe(), "http://localhost/bible/web/");
    }
}
