//! Best-effort verse providers for the network path.
//!
//! Unlike the local resolver this path never fails: providers are tried
//! in order, one attempt each, and an exhausted chain falls back to a
//! fixed local verse. The outcome says which of the two happened.

pub mod bible_api;
pub mod ourmanna;

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::models::{ResolvedVerse, VerseSource};

pub use bible_api::BibleApiProvider;
pub use ourmanna::OurMannaProvider;

/// Upstream bodies quoted in errors are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteMode {
    /// Same verse for the whole day.
    Votd,
    /// A fresh verse per request.
    #[default]
    Random,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRequest {
    pub mode: RemoteMode,
    /// A specific passage such as "John 3:16".
    pub reference: Option<String>,
}

#[async_trait]
pub trait VerseProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// One attempt, no retries. Any error hands over to the next provider.
    async fn fetch(&self, request: &ProviderRequest) -> Result<ResolvedVerse, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub provider: &'static str,
    pub error: ProviderError,
}

#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    /// A provider answered; earlier providers may have failed.
    Upstream {
        verse: ResolvedVerse,
        failures: Vec<FailedAttempt>,
    },
    /// Every provider failed and the local constant stands in.
    Placeholder {
        verse: ResolvedVerse,
        failures: Vec<FailedAttempt>,
    },
}

impl ProviderOutcome {
    pub fn verse(&self) -> &ResolvedVerse {
        match self {
            ProviderOutcome::Upstream { verse, .. } | ProviderOutcome::Placeholder { verse, .. } => {
                verse
            }
        }
    }

    pub fn failures(&self) -> &[FailedAttempt] {
        match self {
            ProviderOutcome::Upstream { failures, .. }
            | ProviderOutcome::Placeholder { failures, .. } => failures,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ProviderOutcome::Placeholder { .. })
    }

    pub fn into_verse(self) -> ResolvedVerse {
        match self {
            ProviderOutcome::Upstream { verse, .. } | ProviderOutcome::Placeholder { verse, .. } => {
                verse
            }
        }
    }
}

/// Ordered providers with a local verse as the last resort.
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn VerseProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn VerseProvider>>) -> Self {
        ProviderChain { providers }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn resolve(&self, request: &ProviderRequest) -> ProviderOutcome {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.fetch(request).await {
                Ok(verse) => return ProviderOutcome::Upstream { verse, failures },
                Err(error) => {
                    tracing::warn!("Verse provider {} failed: {}", provider.name(), error);
                    failures.push(FailedAttempt {
                        provider: provider.name(),
                        error,
                    });
                }
            }
        }

        ProviderOutcome::Placeholder {
            verse: local_fallback(request.mode),
            failures,
        }
    }
}

/// KJV verses shown when no provider can be reached.
pub const LOCAL_VERSES: &[(&str, &str)] = &[
    (
        "John 3:16",
        "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life.",
    ),
    ("Psalm 23:1", "The LORD is my shepherd; I shall not want."),
    (
        "Proverbs 3:5-6",
        "Trust in the LORD with all thine heart; and lean not unto thine own understanding. In all thy ways acknowledge him, and he shall direct thy paths.",
    ),
    (
        "Isaiah 41:10",
        "Fear thou not; for I am with thee: be not dismayed; for I am thy God: I will strengthen thee; yea, I will help thee; yea, I will uphold thee with the right hand of my righteousness.",
    ),
    (
        "Philippians 4:6-7",
        "Be careful for nothing; but in every thing by prayer and supplication with thanksgiving let your requests be made known unto God. And the peace of God, which passeth all understanding, shall keep your hearts and minds through Christ Jesus.",
    ),
    (
        "Romans 8:28",
        "And we know that all things work together for good to them that love God, to them who are the called according to his purpose.",
    ),
    (
        "Matthew 6:33",
        "But seek ye first the kingdom of God, and his righteousness; and all these things shall be added unto you.",
    ),
    (
        "Jeremiah 29:11",
        "For I know the thoughts that I think toward you, saith the LORD, thoughts of peace, and not of evil, to give you an expected end.",
    ),
    (
        "1 Corinthians 10:13",
        "There hath no temptation taken you but such as is common to man: but God is faithful, who will not suffer you to be tempted above that ye are able; but will with the temptation also make a way to escape, that ye may be able to bear it.",
    ),
    (
        "2 Timothy 1:7",
        "For God hath not given us the spirit of fear; but of power, and of love, and of a sound mind.",
    ),
];

const VOTD_FALLBACK: usize = 7;

pub fn local_fallback(mode: RemoteMode) -> ResolvedVerse {
    let idx = match mode {
        RemoteMode::Votd => VOTD_FALLBACK,
        RemoteMode::Random => rand::rng().random_range(0..LOCAL_VERSES.len()),
    };
    let (reference, text) = LOCAL_VERSES[idx];
    ResolvedVerse::new(reference, "KJV", text, VerseSource::LocalFallback)
}

/// GET `url` and parse the body as JSON, mapping every failure mode onto
/// a `ProviderError`.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: reqwest::Url,
) -> Result<T, ProviderError> {
    let response = client
        .get(url)
        .header("accept", "application/json")
        .header("cache-control", "no-store")
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        reply: Result<ResolvedVerse, ProviderError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(name: &'static str, reference: &str) -> Arc<Self> {
            Arc::new(Scripted {
                name,
                reply: Ok(ResolvedVerse::new(reference, "WEB", "text", VerseSource::BibleApi)),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, error: ProviderError) -> Arc<Self> {
            Arc::new(Scripted {
                name,
                reply: Err(error),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VerseProvider for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _request: &ProviderRequest) -> Result<ResolvedVerse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn chain_of(providers: &[&Arc<Scripted>]) -> ProviderChain {
        ProviderChain::new(
            providers
                .iter()
                .map(|p| (*p).clone() as Arc<dyn VerseProvider>)
                .collect(),
        )
    }

    fn server_error() -> ProviderError {
        ProviderError::Status {
            status: 500,
            body: "Internal Server Error".to_string(),
        }
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let primary = Scripted::ok("primary", "John 1:1");
        let secondary = Scripted::ok("secondary", "John 1:2");
        let chain = chain_of(&[&primary, &secondary]);

        let outcome = chain.resolve(&ProviderRequest::default()).await;
        assert!(!outcome.is_placeholder());
        assert_eq!(outcome.verse().reference, "John 1:1");
        assert!(outcome.failures().is_empty());
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn secondary_answers_after_primary_error() {
        let primary = Scripted::failing("primary", server_error());
        let secondary = Scripted::ok("secondary", "John 1:2");
        let chain = chain_of(&[&primary, &secondary]);

        let outcome = chain.resolve(&ProviderRequest::default()).await;
        assert!(!outcome.is_placeholder());
        assert_eq!(outcome.verse().reference, "John 1:2");
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].provider, "primary");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_returns_local_constant() {
        let primary = Scripted::failing("primary", server_error());
        let secondary =
            Scripted::failing("secondary", ProviderError::Network("connection refused".to_string()));
        let chain = chain_of(&[&primary, &secondary]);

        let request = ProviderRequest {
            mode: RemoteMode::Votd,
            reference: None,
        };
        let outcome = chain.resolve(&request).await;
        assert!(outcome.is_placeholder());
        assert_eq!(outcome.failures().len(), 2);

        let verse = outcome.into_verse();
        assert_eq!(verse.reference, "Jeremiah 29:11");
        assert_eq!(verse.source, VerseSource::LocalFallback);
        assert_eq!(verse.translation, "KJV");
    }

    #[tokio::test]
    async fn empty_chain_is_placeholder() {
        let outcome = ProviderChain::default().resolve(&ProviderRequest::default()).await;
        assert!(outcome.is_placeholder());
        let reference = outcome.verse().reference.clone();
        assert!(LOCAL_VERSES.iter().any(|(r, _)| *r == reference));
    }

    #[test]
    fn chain_reports_provider_order() {
        let chain = chain_of(&[&Scripted::ok("ourmanna", "x"), &Scripted::ok("bible-api", "y")]);
        assert_eq!(chain.names(), vec!["ourmanna", "bible-api"]);
    }
}
