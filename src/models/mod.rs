use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Verse-count layout of one translation's corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub translation: String,
    pub total_verses: u64,
    pub books: Vec<Book>,
}

impl Manifest {
    /// Sum of every chapter's verse count.
    pub fn counted_verses(&self) -> u64 {
        self.books
            .iter()
            .flat_map(|book| book.chapters.iter())
            .map(|&count| u64::from(count))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u32,
    pub name: String,
    pub slug: String,
    /// `chapters[i]` is the verse count of chapter `i + 1`; zero marks a
    /// chapter with no text, written as `null` on disk.
    #[serde(
        deserialize_with = "deserialize_chapter_counts",
        serialize_with = "serialize_chapter_counts"
    )]
    pub chapters: Vec<u32>,
}

fn deserialize_chapter_counts<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let counts: Vec<Option<u32>> = Vec::deserialize(deserializer)?;
    Ok(counts.into_iter().map(|c| c.unwrap_or(0)).collect())
}

fn serialize_chapter_counts<S>(counts: &[u32], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let sparse: Vec<Option<u32>> = counts
        .iter()
        .map(|&c| if c == 0 { None } else { Some(c) })
        .collect();
    sparse.serialize(serializer)
}

/// A concrete position in the corpus. Chapter and verse are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseLocation<'a> {
    pub book: &'a Book,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseLocation<'_> {
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book.name, self.chapter, self.verse)
    }
}

/// Where a resolved verse came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerseSource {
    LocalCorpus,
    BibleApi,
    #[serde(rename = "ourmanna")]
    OurManna,
    LocalFallback,
}

impl std::fmt::Display for VerseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerseSource::LocalCorpus => write!(f, "local-corpus"),
            VerseSource::BibleApi => write!(f, "bible-api"),
            VerseSource::OurManna => write!(f, "ourmanna"),
            VerseSource::LocalFallback => write!(f, "local-fallback"),
        }
    }
}

/// The verse shape handed to consumers. `fetched_at` and `source` are
/// informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVerse {
    pub reference: String,
    pub translation: String,
    pub text: String,
    pub fetched_at: DateTime<Utc>,
    pub source: VerseSource,
}

impl ResolvedVerse {
    pub fn new(
        reference: impl Into<String>,
        translation: impl Into<String>,
        text: impl Into<String>,
        source: VerseSource,
    ) -> Self {
        ResolvedVerse {
            reference: reference.into(),
            translation: translation.into(),
            text: text.into(),
            fetched_at: Utc::now(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_chapters_read_as_zero() {
        let raw = r#"{
            "translation": "WEB",
            "totalVerses": 5,
            "books": [{"id": 1, "name": "Genesis", "slug": "01-Genesis", "chapters": [3, null, 2]}]
        }"#;
        let manifest: Manifest = serde_json::from_str(raw).unwrap();
        assert_eq!(manifest.books[0].chapters, vec![3, 0, 2]);
        assert_eq!(manifest.counted_verses(), 5);
    }

    #[test]
    fn zero_chapters_written_as_null() {
        let book = Book {
            id: 1,
            name: "Genesis".to_string(),
            slug: "01-Genesis".to_string(),
            chapters: vec![3, 0],
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["chapters"], serde_json::json!([3, null]));
    }

    #[test]
    fn manifest_without_books_is_rejected() {
        let raw = r#"{"translation": "WEB", "totalVerses": 10}"#;
        assert!(serde_json::from_str::<Manifest>(raw).is_err());
    }

    #[test]
    fn resolved_verse_uses_camel_case_keys() {
        let verse = ResolvedVerse::new("Genesis 1:1", "WEB", "In the beginning", VerseSource::LocalCorpus);
        let json = serde_json::to_value(&verse).unwrap();
        assert!(json.get("fetchedAt").is_some());
        assert_eq!(json["source"], "local-corpus");
    }

    #[test]
    fn source_tags_match_display() {
        for source in [
            VerseSource::LocalCorpus,
            VerseSource::BibleApi,
            VerseSource::OurManna,
            VerseSource::LocalFallback,
        ] {
            let json = serde_json::to_value(source).unwrap();
            assert_eq!(json, serde_json::Value::String(source.to_string()));
        }
    }
}
