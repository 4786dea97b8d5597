use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::services::resolver::DEFAULT_MIN_TOTAL_VERSES;

/// Where the published corpus lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusLocation {
    /// Directory containing one sub-directory per translation.
    Dir(PathBuf),
    /// Base URL with the same layout.
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: SocketAddr,
    pub corpus: CorpusLocation,
    pub translation: String,
    pub min_total_verses: u64,
    pub bible_api_url: String,
    pub ourmanna_url: String,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let raw_bind = var("ONESEED_BIND", "0.0.0.0:3000");
        let bind: SocketAddr = raw_bind
            .parse()
            .with_context(|| format!("ONESEED_BIND is not a socket address: {raw_bind}"))?;

        let corpus = match lookup("ONESEED_CORPUS_URL") {
            Some(url) if !url.trim().is_empty() => CorpusLocation::Url(url),
            _ => CorpusLocation::Dir(PathBuf::from(var("ONESEED_CORPUS_DIR", "./public/bible"))),
        };

        let min_total_verses = match lookup("ONESEED_MIN_TOTAL_VERSES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("ONESEED_MIN_TOTAL_VERSES is not a number: {raw}"))?,
            None => DEFAULT_MIN_TOTAL_VERSES,
        };

        Ok(Config {
            bind,
            corpus,
            translation: var("ONESEED_TRANSLATION", "web"),
            min_total_verses,
            bible_api_url: var("ONESEED_BIBLE_API_URL", "https://bible-api.com/"),
            ourmanna_url: var(
                "ONESEED_OURMANNA_URL",
                "https://beta.ourmanna.com/api/v1/get/?format=json",
            ),
            user_agent: var(
                "ONESEED_USER_AGENT",
                concat!("oneseed/", env!("CARGO_PKG_VERSION")),
            ),
        })
    }
}
