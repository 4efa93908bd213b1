//! In-memory keyword → filename inverted index.
//!
//! [`KeywordIndex`] is fed one block at a time during ingest and answers
//! exact-keyword membership queries. Keywords are lowercased, split on any
//! non-alphanumeric character, and must be at least [`MIN_KEYWORD_LEN`]
//! characters long.
//!
//! Indexing is block-local: a word straddling two blocks is seen as two
//! fragments and is not indexed as a whole. Entries are never removed, so
//! a filename re-ingested with different content keeps the keywords of its
//! earlier versions.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::trace;

/// Shortest token, in characters, that is indexed.
pub const MIN_KEYWORD_LEN: usize = 3;

/// Split text into normalized keywords.
///
/// Lowercases, splits on every non-alphanumeric character and drops tokens
/// shorter than [`MIN_KEYWORD_LEN`]. Duplicates are preserved.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
}

/// Normalize a query keyword the same way indexed tokens are.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Keyword → set of filenames, guarded by a single `RwLock`.
///
/// Lookups share the lock; every insertion takes it exclusively.
#[derive(Default)]
pub struct KeywordIndex {
    entries: RwLock<HashMap<String, HashSet<String>>>,
}

impl KeywordIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one block of `filename`'s content.
    ///
    /// The bytes are decoded as UTF-8; invalid sequences become U+FFFD,
    /// which acts as a separator. Returns the number of keywords that
    /// gained `filename` as a new member.
    pub fn index(&self, filename: &str, block: &[u8]) -> usize {
        let text = String::from_utf8_lossy(block);
        let tokens: HashSet<String> = tokenize(&text).collect();
        if tokens.is_empty() {
            return 0;
        }

        let mut entries = self.entries.write().expect("lock poisoned");
        let mut added = 0;
        for token in tokens {
            let files = entries.entry(token).or_default();
            if !files.contains(filename) {
                files.insert(filename.to_string());
                added += 1;
            }
        }
        trace!(filename, added, "indexed block");
        added
    }

    /// Filenames whose content contained `keyword`, sorted.
    ///
    /// Returns an empty vec for unseen keywords.
    pub fn lookup(&self, keyword: &str) -> Vec<String> {
        let keyword = normalize_keyword(keyword);
        let entries = self.entries.read().expect("lock poisoned");
        let mut files: Vec<String> = entries
            .get(&keyword)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Number of distinct keywords.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Whether nothing has been indexed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
