//! Read-only tiered search over a built index.
//! Tier order: exact, then prefix, then substring, deduplicated across
//! tiers and capped at 100 keys. A store error in one tier degrades to an
//! empty tier; a query never aborts.

use std::collections::HashSet;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use tracing::warn;

use crate::corpus::DictionaryRecord;

/// Overall result cap, shared by all tiers.
pub const RESULT_LIMIT: usize = 100;

/// Handle over one index database. Both indices run the same tier
/// algorithm; only the table and key column differ.
pub struct SearchIndex {
    conn: Mutex<Connection>,
    table: &'static str,
    key: &'static str,
}

/// A gloss row: the fragment plus its serialized ranked candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossEntry {
    pub gloss: String,
    /// Newline-joined `word（translation）` segments, ascending by rank.
    pub english_entries: String,
}

impl GlossEntry {
    /// The ranked segments, one per line.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.english_entries
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

impl SearchIndex {
    /// Open a handle on the word index.
    pub fn open_words(db_path: &Path) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            conn: Mutex::new(Connection::open(db_path)?),
            table: "words",
            key: "word",
        })
    }

    /// Open a handle on the gloss index.
    pub fn open_glosses(db_path: &Path) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            conn: Mutex::new(Connection::open(db_path)?),
            table: "glosses",
            key: "gloss",
        })
    }

    /// Tiered search: exact keys, then prefix matches, then substring
    /// matches, each tier capped at the remaining budget and deduplicated
    /// against everything collected so far.
    pub fn search(&self, query: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let conn = self.conn.lock();
        let (table, key) = (self.table, self.key);

        let sql = format!("SELECT {key} FROM {table} WHERE {key} = ?1 LIMIT ?2");
        collect_tier(
            &conn,
            &sql,
            &[&query, &(RESULT_LIMIT as i64)],
            &mut seen,
            &mut results,
        );
        if results.len() >= RESULT_LIMIT {
            return results;
        }

        let prefix = format!("{query}%");
        let remaining = (RESULT_LIMIT - results.len()) as i64;
        let sql = format!("SELECT {key} FROM {table} WHERE {key} LIKE ?1 AND {key} != ?2 LIMIT ?3");
        collect_tier(
            &conn,
            &sql,
            &[&prefix, &query, &remaining],
            &mut seen,
            &mut results,
        );
        if results.len() >= RESULT_LIMIT {
            return results;
        }

        let contains = format!("%{query}%");
        let remaining = (RESULT_LIMIT - results.len()) as i64;
        let sql = format!(
            "SELECT {key} FROM {table} WHERE {key} LIKE ?1 AND {key} NOT LIKE ?2 LIMIT ?3"
        );
        collect_tier(
            &conn,
            &sql,
            &[&contains, &prefix, &remaining],
            &mut seen,
            &mut results,
        );

        results
    }
}

/// Run one tier query, folding distinct keys into `results`. Any store
/// error is logged and the tier contributes nothing.
fn collect_tier(
    conn: &Connection,
    sql: &str,
    bind: &[&dyn ToSql],
    seen: &mut HashSet<String>,
    results: &mut Vec<String>,
) {
    let mut stmt = match conn.prepare(sql) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "search tier prepare failed");
            return;
        }
    };
    let rows = match stmt.query_map(bind, |row| row.get::<_, String>(0)) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "search tier query failed");
            return;
        }
    };

    for key in rows.flatten() {
        if results.len() >= RESULT_LIMIT {
            break;
        }
        if seen.insert(key.clone()) {
            results.push(key);
        }
    }
}

/// Exact-key point lookup in the word index. Homographs return the first
/// stored row.
pub fn lookup_word(index: &SearchIndex, word: &str) -> Option<DictionaryRecord> {
    let conn = index.conn.lock();
    conn.query_row(
        "SELECT word, phonetic, definition, translation, bnc
         FROM words WHERE word = ?1",
        params![word],
        |row| {
            Ok(DictionaryRecord {
                word: row.get(0)?,
                phonetic: row.get(1)?,
                definition: row.get(2)?,
                translation: row.get(3)?,
                bnc: row.get(4)?,
            })
        },
    )
    .optional()
    .unwrap_or_else(|e| {
        warn!(error = %e, "word lookup failed");
        None
    })
}

/// Exact-key point lookup in the gloss index.
pub fn lookup_gloss(index: &SearchIndex, gloss: &str) -> Option<GlossEntry> {
    let conn = index.conn.lock();
    conn.query_row(
        "SELECT gloss, english_entries FROM glosses WHERE gloss = ?1",
        params![gloss],
        |row| {
            Ok(GlossEntry {
                gloss: row.get(0)?,
                english_entries: row.get(1)?,
            })
        },
    )
    .optional()
    .unwrap_or_else(|e| {
        warn!(error = %e, "gloss lookup failed");
        None
    })
}

/// Sample random common words (0 < bnc < 1000) from the word index.
/// Feeds the caller's empty-query view when there is no history.
pub fn random_words(index: &SearchIndex, count: usize) -> Vec<String> {
    let conn = index.conn.lock();
    let mut stmt = match conn.prepare(
        "SELECT word FROM words
         WHERE CAST(bnc AS INTEGER) > 0 AND CAST(bnc AS INTEGER) < 1000
         ORDER BY RANDOM() LIMIT ?1",
    ) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "random sample prepare failed");
            return Vec::new();
        }
    };
    let words = match stmt.query_map(params![count as i64], |row| row.get::<_, String>(0)) {
        Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
        Err(e) => {
            warn!(error = %e, "random sample query failed");
            Vec::new()
        }
    };
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DictionaryRecord;
    use crate::index;
    use std::path::PathBuf;

    fn record(word: &str, translation: &str, bnc: &str) -> DictionaryRecord {
        DictionaryRecord {
            word: word.to_string(),
            phonetic: String::new(),
            definition: String::new(),
            translation: translation.to_string(),
            bnc: bnc.to_string(),
        }
    }

    fn word_index(dir: &tempfile::TempDir, records: &[DictionaryRecord]) -> (SearchIndex, PathBuf) {
        let db = dir.path().join("words.db");
        index::words::build(&db, records).unwrap();
        (SearchIndex::open_words(&db).unwrap(), db)
    }

    #[test]
    fn tiers_are_ordered_exact_prefix_substring() {
        let dir = tempfile::tempdir().unwrap();
        let (index, _) = word_index(
            &dir,
            &[
                record("dislike", "不喜欢", "90"),
                record("like", "喜欢", "25"),
                record("likely", "很可能的", "60"),
            ],
        );

        // No exact match for "lik": prefix tier first, then substring.
        assert_eq!(index.search("lik"), vec!["like", "likely", "dislike"]);
        // Exact match leads when present.
        assert_eq!(index.search("like"), vec!["like", "likely", "dislike"]);
    }

    #[test]
    fn homographs_appear_once() {
        let dir = tempfile::tempdir().unwrap();
        let (index, _) = word_index(
            &dir,
            &[record("bank", "银行", "300"), record("bank", "河岸", "")],
        );
        assert_eq!(index.search("bank"), vec!["bank"]);
        assert_eq!(index.search("ban"), vec!["bank"]);
    }

    #[test]
    fn results_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<_> = (0..150)
            .map(|i| record(&format!("word{i:03}"), "词", "10"))
            .collect();
        let (index, _) = word_index(&dir, &records);

        let results = index.search("word");
        assert_eq!(results.len(), RESULT_LIMIT);
    }

    #[test]
    fn loosening_constraints_never_loses_results() {
        let dir = tempfile::tempdir().unwrap();
        let (index, _) = word_index(
            &dir,
            &[
                record("like", "喜欢", "25"),
                record("likely", "很可能的", "60"),
                record("dislike", "不喜欢", "90"),
            ],
        );
        let results = index.search("like");
        // Exact result is a prefix of the full tiered set.
        assert_eq!(&results[..1], &["like"]);
        assert!(results.len() >= 2);
    }

    #[test]
    fn word_lookup_returns_first_row_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = record("like", r"喜欢\n像", "25");
        first.phonetic = "/laɪk/".to_string();
        first.definition = "similar to".to_string();
        let (index, _) = word_index(&dir, &[first.clone(), record("like", "别的", "1")]);

        let entry = lookup_word(&index, "like").unwrap();
        assert_eq!(entry, first);
        assert!(lookup_word(&index, "absent").is_none());
    }

    #[test]
    fn gloss_search_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("glosses.db");
        index::glosses::build(
            &db,
            &[
                record("like", r"喜欢\n像", "25"),
                record("love", "喜欢, 爱", "12"),
                record("favor", "喜欢的事物", "800"),
            ],
        )
        .unwrap();
        let index = SearchIndex::open_glosses(&db).unwrap();

        // Exact gloss first, then the longer gloss it prefixes.
        assert_eq!(index.search("喜欢"), vec!["喜欢", "喜欢的事物"]);

        let entry = lookup_gloss(&index, "喜欢").unwrap();
        let segments: Vec<&str> = entry.segments().collect();
        // love (rank 12) precedes like (rank 25).
        assert_eq!(segments, vec!["love（喜欢, 爱）", "like（喜欢\\n像）"]);
    }

    #[test]
    fn random_words_respects_bnc_window() {
        let dir = tempfile::tempdir().unwrap();
        let (index, _) = word_index(
            &dir,
            &[
                record("common", "常见", "500"),
                record("rare", "罕见", "200000"),
                record("unranked", "无", ""),
            ],
        );
        let words = random_words(&index, 10);
        assert_eq!(words, vec!["common"]);
    }
}
