//! Builds the per-chapter corpus files and the manifest from a
//! public-domain source text laid out as one event list per book.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::models::{Book, Manifest};
use crate::services::corpus::{MANIFEST_PATH, chapter_path};

/// The 66 books in Protestant canonical order.
pub const CANONICAL_BOOKS: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
    "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
    "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

/// No canonical book has more chapters than the Psalms.
pub const MAX_CHAPTERS: u32 = 150;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// `"09-1Samuel"` for the ninth book. `ordinal` is 1-based.
pub fn book_slug(ordinal: usize, name: &str) -> String {
    format!("{:02}-{}", ordinal, WHITESPACE.replace_all(name, ""))
}

/// Source file name for a book: lower-cased, whitespace removed.
pub fn source_file_name(name: &str) -> String {
    format!("{}.json", WHITESPACE.replace_all(name, "").to_lowercase())
}

/// One entry of a book's source event list. Unknown event types and
/// fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub chapter_number: Option<u32>,
    pub verse_number: Option<u32>,
    pub value: Option<String>,
}

/// Group text events into chapters. `result[c]` holds chapter `c + 1`;
/// `None` marks a chapter with no text. Verses missing inside a chapter
/// become empty strings so positions stay aligned with verse numbers.
pub fn chapters_from_events(events: &[SourceEvent]) -> Vec<Option<Vec<String>>> {
    let mut chapters: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    for event in events {
        let (Some(chapter), Some(verse)) = (event.chapter_number, event.verse_number) else {
            continue;
        };
        if chapter == 0 || verse == 0 {
            continue;
        }
        if chapter > MAX_CHAPTERS {
            tracing::warn!("Ignoring event for implausible chapter {}", chapter);
            continue;
        }
        if !matches!(event.kind.as_deref(), Some("paragraph text" | "line text")) {
            continue;
        }
        chapters
            .entry(chapter)
            .or_default()
            .entry(verse)
            .or_default()
            .push_str(event.value.as_deref().unwrap_or(""));
    }

    let last = chapters.keys().next_back().copied().unwrap_or(0);
    let mut out = vec![None; last as usize];
    for (chapter, verses) in chapters {
        let max_verse = verses.keys().next_back().copied().unwrap_or(0);
        let texts: Vec<String> = (1..=max_verse)
            .map(|v| verses.get(&v).map(|t| t.trim().to_string()).unwrap_or_default())
            .collect();
        out[chapter as usize - 1] = Some(texts);
    }
    out
}

/// Outcome of a corpus build.
#[derive(Debug)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub skipped: Vec<String>,
}

/// Read every canonical book from `src_dir` and write chapter files plus
/// `manifest.json` under `out_dir`. Books whose source cannot be read or
/// parsed are logged and left out of the manifest.
pub fn build_corpus(src_dir: &Path, out_dir: &Path, translation: &str) -> Result<BuildReport> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut manifest = Manifest {
        translation: translation.to_string(),
        total_verses: 0,
        books: Vec::new(),
    };
    let mut skipped = Vec::new();

    for (i, name) in CANONICAL_BOOKS.iter().enumerate() {
        let ordinal = i + 1;
        let input: PathBuf = src_dir.join(source_file_name(name));

        let events = match read_events(&input) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Skipping {}: {:#}", name, e);
                skipped.push(name.to_string());
                continue;
            }
        };

        tracing::info!("Processing {}...", name);
        let slug = book_slug(ordinal, name);
        let book = write_book(out_dir, ordinal, name, &slug, &events)?;
        manifest.total_verses += book.chapters.iter().map(|&c| u64::from(c)).sum::<u64>();
        manifest.books.push(book);
    }

    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(out_dir.join(MANIFEST_PATH), manifest_json)
        .with_context(|| format!("writing manifest in {}", out_dir.display()))?;
    tracing::info!("Done. totalVerses = {}", manifest.total_verses);

    Ok(BuildReport { manifest, skipped })
}

fn read_events(path: &Path) -> Result<Vec<SourceEvent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let events = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(events)
}

fn write_book(
    out_dir: &Path,
    ordinal: usize,
    name: &str,
    slug: &str,
    events: &[SourceEvent],
) -> Result<Book> {
    std::fs::create_dir_all(out_dir.join(slug))?;

    let mut counts = Vec::new();
    for (idx, verses) in chapters_from_events(events).into_iter().enumerate() {
        match verses {
            Some(verses) if !verses.is_empty() => {
                let path = out_dir.join(chapter_path(slug, idx as u32 + 1));
                std::fs::write(&path, serde_json::to_string(&verses)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                counts.push(verses.len() as u32);
            }
            _ => counts.push(0),
        }
    }

    Ok(Book {
        id: ordinal as u32,
        name: name.to_string(),
        slug: slug.to_string(),
        chapters: counts,
    })
}
