use thiserror::Error;

/// Failures on the local-corpus path. None of these are recovered from
/// internally; each one points at a corpus or build defect the caller
/// should see.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The manifest could not be fetched or did not parse.
    #[error("manifest unavailable: {0}")]
    ManifestUnavailable(String),

    /// The manifest parsed but its counts are not trustworthy.
    #[error("corpus integrity error: {0}")]
    CorpusIntegrityError(String),

    /// There is nothing to select from.
    #[error("invalid corpus: total verse count is {total}")]
    InvalidCorpus { total: u64 },

    /// A global index past the end of the corpus was mapped.
    #[error("index {index} out of range for corpus of {total} verses")]
    IndexOutOfRange { index: u64, total: u64 },

    /// The chapter resource was missing, malformed or too short.
    #[error("chapter fetch failed for {key}: {reason}")]
    ChapterFetchFailed { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// A single failed attempt on the provider path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Upstream answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}
