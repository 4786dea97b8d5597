use async_trait::async_trait;
use serde::Deserialize;

use super::{ProviderRequest, VerseProvider, get_json};
use crate::error::ProviderError;
use crate::models::{ResolvedVerse, VerseSource};

/// OurManna verse of the day. Keyless and the same for everyone per day;
/// it ignores any requested reference.
pub struct OurMannaProvider {
    client: reqwest::Client,
    url: reqwest::Url,
}

#[derive(Debug, Deserialize)]
pub struct OurMannaResponse {
    pub verse: Option<OurMannaVerse>,
}

#[derive(Debug, Deserialize)]
pub struct OurMannaVerse {
    pub details: Option<OurMannaDetails>,
}

#[derive(Debug, Deserialize)]
pub struct OurMannaDetails {
    pub text: Option<String>,
    pub reference: Option<String>,
    pub version: Option<String>,
}

impl OurMannaProvider {
    pub fn new(client: reqwest::Client, url: &str) -> anyhow::Result<Self> {
        Ok(OurMannaProvider {
            client,
            url: reqwest::Url::parse(url)?,
        })
    }
}

pub fn normalize(response: OurMannaResponse) -> Result<ResolvedVerse, ProviderError> {
    let details = response
        .verse
        .and_then(|v| v.details)
        .ok_or_else(|| ProviderError::Malformed("ourmanna response has no verse details".to_string()))?;

    let text = details.text.unwrap_or_default().trim().to_string();
    if text.is_empty() {
        return Err(ProviderError::Malformed("ourmanna returned no verse text".to_string()));
    }

    let reference = details
        .reference
        .unwrap_or_else(|| "Verse of the Day".to_string());
    let translation = details
        .version
        .unwrap_or_else(|| "web".to_string())
        .to_uppercase();

    Ok(ResolvedVerse::new(reference, translation, text, VerseSource::OurManna))
}

#[async_trait]
impl VerseProvider for OurMannaProvider {
    fn name(&self) -> &'static str {
        "ourmanna"
    }

    async fn fetch(&self, _request: &ProviderRequest) -> Result<ResolvedVerse, ProviderError> {
        let body: OurMannaResponse = get_json(&self.client, self.url.clone()).await?;
        normalize(body)
    }
}
