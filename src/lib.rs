//! cidian: bidirectional English-Chinese dictionary indexer.
//! Builds two SQLite indices from a flat corpus (word -> entry and gloss ->
//! ranked words) and serves tiered substring search over either direction.

pub mod corpus;
pub mod gloss;
pub mod index;
pub mod recent;
pub mod search;

use std::path::Path;

pub use corpus::{DictionaryRecord, UNRANKED};
pub use index::{build_indices, BuildError, BuildSummary};
pub use recent::{RecentList, RECENT_CAPACITY};
pub use search::{GlossEntry, SearchIndex, RESULT_LIMIT};

/// Context object owning both index handles and the recency list. Every
/// operation goes through a `Dictionary`; there is no ambient global state.
pub struct Dictionary {
    words: SearchIndex,
    glosses: SearchIndex,
    recent: RecentList,
}

impl Dictionary {
    /// Open handles on both built indices.
    pub fn open(word_db: &Path, gloss_db: &Path) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            words: SearchIndex::open_words(word_db)?,
            glosses: SearchIndex::open_glosses(gloss_db)?,
            recent: RecentList::new(),
        })
    }

    /// Tiered search with direction dispatch: a query containing any Han
    /// character searches the gloss index, anything else the word index.
    pub fn search(&self, query: &str) -> Vec<String> {
        if gloss::contains_han(query) {
            self.glosses.search(query)
        } else {
            self.words.search(query)
        }
    }

    /// Point lookup of a word entry (first row for homographs).
    pub fn lookup_word(&self, word: &str) -> Option<DictionaryRecord> {
        search::lookup_word(&self.words, word)
    }

    /// Point lookup of a gloss and its ranked candidates.
    pub fn lookup_gloss(&self, gloss: &str) -> Option<GlossEntry> {
        search::lookup_gloss(&self.glosses, gloss)
    }

    /// Random sample of common words, for the caller's empty-query view.
    pub fn random_words(&self, count: usize) -> Vec<String> {
        search::random_words(&self.words, count)
    }

    /// Record a selected key in the recency list.
    pub fn recent_add(&self, key: &str) {
        self.recent.add(key);
    }

    /// Copy of the recency list, most recent first.
    pub fn recent_snapshot(&self) -> Vec<String> {
        self.recent.snapshot()
    }
}
