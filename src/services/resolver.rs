//! The local-corpus verse resolver.
//!
//! Owns the memoized manifest and the chapter cache. One resolver is
//! built per process and shared by reference; nothing here is global.
//! Every failure propagates: substituting another verse would break the
//! daily and seeded guarantees.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

use crate::error::{ResolveError, Result};
use crate::models::{Manifest, ResolvedVerse, VerseSource};
use crate::services::corpus::{CorpusSource, MANIFEST_PATH, chapter_path};
use crate::services::mapping::map_global_index;
use crate::services::selection::SelectionMode;

/// Smallest `totalVerses` accepted for a full-Bible corpus.
pub const DEFAULT_MIN_TOTAL_VERSES: u64 = 10_000;

pub struct VerseResolver {
    source: Arc<dyn CorpusSource>,
    min_total_verses: u64,
    manifest: OnceCell<Arc<Manifest>>,
    chapters: RwLock<HashMap<String, Arc<Vec<String>>>>,
}

impl VerseResolver {
    pub fn new(source: Arc<dyn CorpusSource>) -> Self {
        VerseResolver {
            source,
            min_total_verses: DEFAULT_MIN_TOTAL_VERSES,
            manifest: OnceCell::new(),
            chapters: RwLock::new(HashMap::new()),
        }
    }

    /// Lower the integrity floor, for partial or test corpora.
    pub fn with_min_total_verses(mut self, floor: u64) -> Self {
        self.min_total_verses = floor;
        self
    }

    /// The validated manifest, loaded on first use. A failed load is not
    /// remembered, so the next call tries again.
    pub async fn manifest(&self) -> Result<Arc<Manifest>> {
        self.manifest
            .get_or_try_init(|| self.load_manifest())
            .await
            .cloned()
    }

    async fn load_manifest(&self) -> Result<Arc<Manifest>> {
        let bytes = self
            .source
            .read(MANIFEST_PATH)
            .await
            .map_err(|e| ResolveError::ManifestUnavailable(e.to_string()))?;
        let manifest: Manifest = serde_json::from_slice(&bytes)
            .map_err(|e| ResolveError::ManifestUnavailable(format!("malformed manifest: {e}")))?;

        validate_manifest(&manifest, self.min_total_verses)?;

        tracing::info!(
            "Loaded {} manifest from {}: {} books, {} verses",
            manifest.translation,
            self.source.describe(),
            manifest.books.len(),
            manifest.total_verses
        );
        Ok(Arc::new(manifest))
    }

    /// Verse texts of one chapter, index 0 holding verse 1. Chapters never
    /// change once published, so they stay cached for the resolver's life.
    pub async fn chapter(&self, slug: &str, chapter: u32) -> Result<Arc<Vec<String>>> {
        let key = chapter_path(slug, chapter);
        if let Some(verses) = self.chapters.read().await.get(&key) {
            return Ok(Arc::clone(verses));
        }

        let failed = |reason: String| ResolveError::ChapterFetchFailed {
            key: format!("{slug}/{chapter}"),
            reason,
        };
        let bytes = self
            .source
            .read(&key)
            .await
            .map_err(|e| failed(e.to_string()))?;
        let verses: Vec<String> =
            serde_json::from_slice(&bytes).map_err(|e| failed(format!("malformed chapter: {e}")))?;

        let verses = Arc::new(verses);
        self.chapters
            .write()
            .await
            .insert(key, Arc::clone(&verses));
        Ok(verses)
    }

    pub async fn resolve(&self, mode: SelectionMode) -> Result<ResolvedVerse> {
        self.resolve_at(mode, Utc::now()).await
    }

    /// Resolve with an explicit clock reading; only `Daily` looks at `now`.
    pub async fn resolve_at(&self, mode: SelectionMode, now: DateTime<Utc>) -> Result<ResolvedVerse> {
        let manifest = self.manifest().await?;
        let index = mode.select(manifest.total_verses, now)?;
        let location = map_global_index(&manifest, index)?;

        let verses = self.chapter(&location.book.slug, location.chapter).await?;
        let text = verses
            .get(location.verse as usize - 1)
            .map(|t| t.trim())
            .ok_or_else(|| ResolveError::ChapterFetchFailed {
                key: format!("{}/{}", location.book.slug, location.chapter),
                reason: format!(
                    "chapter has {} verses, manifest expects at least {}",
                    verses.len(),
                    location.verse
                ),
            })?;

        let reference = location.reference();
        tracing::debug!("Resolved {} (index {}) via {}", reference, index, mode);

        Ok(ResolvedVerse::new(
            reference,
            manifest.translation.clone(),
            text,
            VerseSource::LocalCorpus,
        ))
    }
}

/// Reject manifests whose counts cannot be trusted for selection.
pub fn validate_manifest(manifest: &Manifest, min_total_verses: u64) -> Result<()> {
    if manifest.total_verses < min_total_verses {
        return Err(ResolveError::CorpusIntegrityError(format!(
            "totalVerses={} is below the floor of {}; rebuild the corpus",
            manifest.total_verses, min_total_verses
        )));
    }

    let counted = manifest.counted_verses();
    if counted != manifest.total_verses {
        return Err(ResolveError::CorpusIntegrityError(format!(
            "totalVerses={} but chapters sum to {}",
            manifest.total_verses, counted
        )));
    }

    Ok(())
}
