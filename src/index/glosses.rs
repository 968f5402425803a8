//! Reverse index builder: gloss fragment -> ranked source words.
//! Runs single-threaded over the full in-memory corpus; a gloss's ranking
//! is only known once every word mapping to it has been seen. All rows go
//! out in one transaction, stricter than the forward builder's per-batch
//! commits (deliberate: a partial gloss table is never usable).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rusqlite::params;
use tracing::{info, warn};

use super::{open_store, BuildError};
use crate::corpus::{parse_bnc, DictionaryRecord, UNRANKED};
use crate::gloss::extract_glosses;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS glosses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        gloss TEXT NOT NULL UNIQUE,
        english_entries TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_gloss ON glosses(gloss);
";

const INSERT: &str = "INSERT INTO glosses (gloss, english_entries) VALUES (?1, ?2)";

/// Build the gloss index. Returns gloss rows committed.
pub fn build(db_path: &Path, records: &[DictionaryRecord]) -> Result<u64, BuildError> {
    let mut conn = open_store(db_path)?;
    conn.execute_batch(SCHEMA)?;

    // gloss -> (word, translation) candidates in corpus observation order.
    // First write wins per (gloss, word) pair.
    let mut candidates: HashMap<String, Vec<(String, String)>> = HashMap::new();
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();

    for record in records {
        if record.translation.is_empty() {
            continue;
        }
        for gloss in extract_glosses(&record.translation) {
            let pair = (gloss.clone(), record.word.clone());
            if seen_pairs.contains(&pair) {
                continue;
            }
            candidates
                .entry(gloss)
                .or_default()
                .push((record.word.clone(), record.translation.clone()));
            seen_pairs.insert(pair);
        }
    }

    // word -> frequency rank, first write wins. Drawn from the same
    // translation-bearing rows the candidates come from.
    let mut ranks: HashMap<&str, u32> = HashMap::new();
    for record in records {
        if record.translation.is_empty() {
            continue;
        }
        ranks
            .entry(record.word.as_str())
            .or_insert_with(|| parse_bnc(&record.bnc));
    }

    info!(glosses = candidates.len(), "reverse aggregation done");

    let tx = conn.transaction()?;
    let mut count = 0u64;
    {
        let mut stmt = tx.prepare_cached(INSERT)?;
        for (gloss, words) in &candidates {
            let serialized = serialize_entries(words, &ranks);
            match stmt.execute(params![gloss, serialized]) {
                Ok(_) => count += 1,
                Err(e) => warn!(error = %e, gloss = %gloss, "gloss insert skipped"),
            }
        }
    }
    tx.commit()?;

    info!(rows = count, path = %db_path.display(), "gloss index built");
    Ok(count)
}

/// Order candidates ascending by rank and join `word（translation）` segments
/// with newlines. The sort is stable: equal ranks keep their first-observed
/// corpus order, so output is reproducible.
fn serialize_entries(
    words: &[(String, String)],
    ranks: &HashMap<&str, u32>,
) -> String {
    let mut ranked: Vec<(&str, &str, u32)> = words
        .iter()
        .map(|(word, translation)| {
            let rank = ranks.get(word.as_str()).copied().unwrap_or(UNRANKED);
            (word.as_str(), translation.as_str(), rank)
        })
        .collect();
    ranked.sort_by_key(|&(_, _, rank)| rank);

    let segments: Vec<String> = ranked
        .iter()
        .map(|(word, translation, _)| format!("{word}（{translation}）"))
        .collect();
    segments.join("\n")
}
