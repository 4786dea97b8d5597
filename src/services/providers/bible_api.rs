use async_trait::async_trait;
use serde::Deserialize;

use super::{ProviderRequest, VerseProvider, get_json};
use crate::error::ProviderError;
use crate::models::{ResolvedVerse, VerseSource};

/// bible-api.com: random verses and lookups by reference.
pub struct BibleApiProvider {
    client: reqwest::Client,
    base_url: reqwest::Url,
    translation: String,
}

#[derive(Debug, Deserialize)]
pub struct BibleApiResponse {
    pub reference: Option<String>,
    pub verses: Option<Vec<BibleApiVerse>>,
    pub text: Option<String>,
    pub translation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BibleApiVerse {
    #[serde(default)]
    pub text: String,
}

impl BibleApiProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = reqwest::Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("bible-api base URL {} cannot take a path", base_url);
        }
        Ok(BibleApiProvider {
            client,
            base_url,
            translation: "web".to_string(),
        })
    }

    /// `<base>/<reference>` or `<base>/random`, with the translation query.
    pub fn url_for(&self, reference: Option<&str>) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(reference.unwrap_or("random"));
        }
        url.query_pairs_mut()
            .append_pair("translation", &self.translation);
        url
    }
}

/// Fold a bible-api body into the common verse shape. Passage lookups
/// come back as a list of fragments; single verses may only carry `text`.
pub fn normalize(
    response: BibleApiResponse,
    requested: Option<&str>,
) -> Result<ResolvedVerse, ProviderError> {
    let text = match response.verses {
        Some(verses) if !verses.is_empty() => verses
            .iter()
            .map(|v| v.text.as_str())
            .collect::<String>()
            .trim()
            .to_string(),
        _ => response.text.unwrap_or_default().trim().to_string(),
    };
    if text.is_empty() {
        return Err(ProviderError::Malformed("bible-api returned no verse text".to_string()));
    }

    let reference = response
        .reference
        .or_else(|| requested.map(str::to_string))
        .unwrap_or_else(|| "Random Verse".to_string());
    let translation = response
        .translation_id
        .unwrap_or_else(|| "web".to_string())
        .to_uppercase();

    Ok(ResolvedVerse::new(reference, translation, text, VerseSource::BibleApi))
}

#[async_trait]
impl VerseProvider for BibleApiProvider {
    fn name(&self) -> &'static str {
        "bible-api"
    }

    async fn fetch(&self, request: &ProviderRequest) -> Result<ResolvedVerse, ProviderError> {
        let reference = request.reference.as_deref();
        let body: BibleApiResponse = get_json(&self.client, self.url_for(reference)).await?;
        normalize(body, reference)
    }
}
