use crate::error::{ResolveError, Result};
use crate::models::{Manifest, VerseLocation};

/// Map a global verse index onto its book, chapter and verse.
///
/// Books and chapters are walked in manifest order with a running
/// remainder. A zero-count chapter can never satisfy `remaining < count`
/// and subtracting zero leaves the remainder untouched, so empty chapters
/// are skipped without taking up an index.
pub fn map_global_index(manifest: &Manifest, global_index: u64) -> Result<VerseLocation<'_>> {
    let mut remaining = global_index;
    for book in &manifest.books {
        for (offset, &count) in book.chapters.iter().enumerate() {
            let count = u64::from(count);
            if remaining < count {
                return Ok(VerseLocation {
                    book,
                    chapter: offset as u32 + 1,
                    verse: remaining as u32 + 1,
                });
            }
            remaining -= count;
        }
    }

    Err(ResolveError::IndexOutOfRange {
        index: global_index,
        total: manifest.total_verses,
    })
}

/// Inverse of [`map_global_index`]. Returns `None` when the location does
/// not exist in the manifest or lands in an empty chapter.
pub fn global_index_of(manifest: &Manifest, book_id: u32, chapter: u32, verse: u32) -> Option<u64> {
    let mut offset = 0u64;
    for book in &manifest.books {
        for (idx, &count) in book.chapters.iter().enumerate() {
            if book.id == book_id && idx as u32 + 1 == chapter {
                if verse == 0 || verse > count {
                    return None;
                }
                return Some(offset + u64::from(verse) - 1);
            }
            offset += u64::from(count);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;

    fn book(id: u32, name: &str, chapters: Vec<u32>) -> Book {
        Book {
            id,
            name: name.to_string(),
            slug: format!("{:02}-{}", id, name.replace(' ', "")),
            chapters,
        }
    }

    fn genesis_manifest() -> Manifest {
        let mut genesis = vec![31, 25, 24];
        genesis.resize(50, 20);
        let mut manifest = Manifest {
            translation: "WEB".to_string(),
            total_verses: 0,
            books: vec![book(1, "Genesis", genesis), book(2, "Exodus", vec![22, 25])],
        };
        manifest.total_verses = manifest.counted_verses();
        manifest
    }

    fn gappy_manifest() -> Manifest {
        let mut manifest = Manifest {
            translation: "WEB".to_string(),
            total_verses: 0,
            books: vec![
                book(1, "Genesis", vec![0, 3, 0, 0, 2]),
                book(2, "Exodus", vec![]),
                book(3, "Leviticus", vec![0]),
                book(4, "Numbers", vec![4, 0, 1]),
            ],
        };
        manifest.total_verses = manifest.counted_verses();
        manifest
    }

    #[test]
    fn genesis_boundaries() {
        let manifest = genesis_manifest();

        let first = map_global_index(&manifest, 0).unwrap();
        assert_eq!((first.book.name.as_str(), first.chapter, first.verse), ("Genesis", 1, 1));

        let last_of_chapter = map_global_index(&manifest, 30).unwrap();
        assert_eq!((last_of_chapter.chapter, last_of_chapter.verse), (1, 31));

        let next_chapter = map_global_index(&manifest, 31).unwrap();
        assert_eq!((next_chapter.chapter, next_chapter.verse), (2, 1));
        assert_eq!(next_chapter.reference(), "Genesis 2:1");
    }

    #[test]
    fn crosses_into_next_book() {
        let manifest = genesis_manifest();
        let genesis_total: u64 = manifest.books[0].chapters.iter().map(|&c| u64::from(c)).sum();
        let loc = map_global_index(&manifest, genesis_total).unwrap();
        assert_eq!(loc.reference(), "Exodus 1:1");
    }

    #[test]
    fn every_index_round_trips() {
        for manifest in [genesis_manifest(), gappy_manifest()] {
            for index in 0..manifest.total_verses {
                let loc = map_global_index(&manifest, index).unwrap();
                assert_eq!(
                    global_index_of(&manifest, loc.book.id, loc.chapter, loc.verse),
                    Some(index)
                );
            }
        }
    }

    #[test]
    fn empty_chapters_are_never_targets() {
        let manifest = gappy_manifest();
        for index in 0..manifest.total_verses {
            let loc = map_global_index(&manifest, index).unwrap();
            assert!(loc.book.chapters[loc.chapter as usize - 1] > 0);
        }
        assert_eq!(map_global_index(&manifest, 0).unwrap().reference(), "Genesis 2:1");
        assert_eq!(map_global_index(&manifest, 3).unwrap().reference(), "Genesis 5:1");
        assert_eq!(map_global_index(&manifest, 9).unwrap().reference(), "Numbers 3:1");
    }

    #[test]
    fn index_past_end_is_out_of_range() {
        let manifest = gappy_manifest();
        let err = map_global_index(&manifest, manifest.total_verses).unwrap_err();
        assert_eq!(
            err,
            ResolveError::IndexOutOfRange {
                index: 10,
                total: 10
            }
        );
    }

    #[test]
    fn inverse_rejects_missing_locations() {
        let manifest = gappy_manifest();
        assert_eq!(global_index_of(&manifest, 1, 1, 1), None);
        assert_eq!(global_index_of(&manifest, 1, 2, 4), None);
        assert_eq!(global_index_of(&manifest, 9, 1, 1), None);
    }
}
