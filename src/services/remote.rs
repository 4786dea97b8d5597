//! Verse-of-the-day over the network: picks a provider chain per request
//! and keeps today's upstream answer so repeat visits skip the network.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::ResolvedVerse;
use crate::services::providers::{
    ProviderChain, ProviderOutcome, ProviderRequest, RemoteMode, VerseProvider,
};

pub struct RemoteVerses {
    bible_api: Arc<dyn VerseProvider>,
    ourmanna: Arc<dyn VerseProvider>,
    today: Mutex<Option<(NaiveDate, ResolvedVerse)>>,
}

impl RemoteVerses {
    pub fn new(bible_api: Arc<dyn VerseProvider>, ourmanna: Arc<dyn VerseProvider>) -> Self {
        RemoteVerses {
            bible_api,
            ourmanna,
            today: Mutex::new(None),
        }
    }

    /// Reference lookups and random requests only make sense against
    /// bible-api; the daily verse prefers OurManna and falls back to a
    /// bible-api random pick.
    pub fn chain_for(&self, request: &ProviderRequest) -> ProviderChain {
        let providers = match (request.mode, &request.reference) {
            (_, Some(_)) | (RemoteMode::Random, None) => vec![Arc::clone(&self.bible_api)],
            (RemoteMode::Votd, None) => {
                vec![Arc::clone(&self.ourmanna), Arc::clone(&self.bible_api)]
            }
        };
        ProviderChain::new(providers)
    }

    pub async fn fetch(&self, request: &ProviderRequest, fresh: bool) -> ProviderOutcome {
        self.fetch_on(request, fresh, Utc::now().date_naive()).await
    }

    /// As [`fetch`](Self::fetch) with the UTC date supplied by the caller.
    pub async fn fetch_on(
        &self,
        request: &ProviderRequest,
        fresh: bool,
        date: NaiveDate,
    ) -> ProviderOutcome {
        let daily = request.mode == RemoteMode::Votd && request.reference.is_none();

        if daily && !fresh {
            if let Some(verse) = self.cached(date).await {
                tracing::debug!("Serving cached verse of the day for {}", date);
                return ProviderOutcome::Upstream {
                    verse,
                    failures: Vec::new(),
                };
            }
        }

        let outcome = self.chain_for(request).resolve(request).await;
        if !daily {
            return outcome;
        }

        match outcome {
            ProviderOutcome::Upstream { verse, failures } => {
                // A forced refresh never replaces the day's entry.
                if !fresh {
                    *self.today.lock().await = Some((date, verse.clone()));
                }
                ProviderOutcome::Upstream { verse, failures }
            }
            ProviderOutcome::Placeholder { verse, failures } => match self.cached(date).await {
                Some(cached) => ProviderOutcome::Upstream {
                    verse: cached,
                    failures,
                },
                None => ProviderOutcome::Placeholder { verse, failures },
            },
        }
    }

    async fn cached(&self, date: NaiveDate) -> Option<ResolvedVerse> {
        match &*self.today.lock().await {
            Some((day, verse)) if *day == date => Some(verse.clone()),
            _ => None,
        }
    }
}
