//! Corpus ingestion: ECDICT-style CSV rows into in-memory records.
//! The whole corpus is materialized before indexing because the reverse
//! index needs a global view of every word that maps to a gloss.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Rank assigned to words with an empty, zero, or unparsable frequency.
/// Sorts after every real rank.
pub const UNRANKED: u32 = 1 << 30;

/// Minimum field count for a usable corpus row.
const MIN_FIELDS: usize = 13;

/// One dictionary entry as read from the corpus.
/// `definition` and `translation` keep their literal `\n` escape sequences;
/// unescaping is the display layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    pub word: String,
    pub phonetic: String,
    pub definition: String,
    pub translation: String,
    /// BNC frequency, raw string from the corpus (may be empty or junk).
    pub bnc: String,
}

#[derive(Debug)]
pub enum CorpusError {
    Open(csv::Error),
}

impl std::fmt::Display for CorpusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusError::Open(e) => write!(f, "failed to open corpus: {e}"),
        }
    }
}

impl std::error::Error for CorpusError {}

/// Parse a raw BNC frequency string. Empty, zero, or non-numeric values
/// all map to [`UNRANKED`] — never an error.
pub fn parse_bnc(bnc: &str) -> u32 {
    let bnc = bnc.trim();
    if bnc.is_empty() {
        return UNRANKED;
    }
    match bnc.parse::<u32>() {
        Ok(0) | Err(_) => UNRANKED,
        Ok(n) => n,
    }
}

/// Read the full corpus into memory. The header row is skipped; rows with
/// fewer than 13 fields or row-level parse failures are dropped, never fatal.
pub fn read_corpus(path: &Path) -> Result<Vec<DictionaryRecord>, CorpusError> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(CorpusError::Open)?;

    let records = read_records(reader);
    info!(path = %path.display(), records = records.len(), "corpus loaded");
    Ok(records)
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Vec<DictionaryRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = match row {
            Ok(r) => r,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        if row.len() < MIN_FIELDS {
            skipped += 1;
            continue;
        }
        records.push(DictionaryRecord {
            word: row[0].to_string(),
            phonetic: row[1].to_string(),
            definition: row[2].to_string(),
            translation: row[3].to_string(),
            bnc: row[8].to_string(),
        });
    }

    if skipped > 0 {
        debug!(skipped, "corpus rows dropped");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_from(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes())
    }

    const HEADER: &str = "word,phonetic,definition,translation,pos,collins,oxford,tag,bnc,frq,exchange,detail,audio\n";

    #[test]
    fn parse_bnc_sentinel_cases() {
        assert_eq!(parse_bnc(""), UNRANKED);
        assert_eq!(parse_bnc("  "), UNRANKED);
        assert_eq!(parse_bnc("0"), UNRANKED);
        assert_eq!(parse_bnc("abc"), UNRANKED);
        assert_eq!(parse_bnc("-5"), UNRANKED);
        assert_eq!(parse_bnc("25"), 25);
        assert_eq!(parse_bnc(" 25 "), 25);
    }

    #[test]
    fn sentinel_sorts_after_every_real_rank() {
        assert!(parse_bnc("999999999") < UNRANKED);
        assert!(parse_bnc("1") < parse_bnc(""));
    }

    #[test]
    fn short_rows_are_skipped() {
        let data = format!("{HEADER}like,/laɪk/,similar to,喜欢,,,,,25,,,,\nbroken,row\n");
        let records = read_records(reader_from(&data));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].word, "like");
    }

    #[test]
    fn fields_pass_through_verbatim() {
        let data = format!("{HEADER}like,/laɪk/,similar to,\"喜欢\\n像\",,,,,25,,,,\n");
        let records = read_records(reader_from(&data));
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.word, "like");
        assert_eq!(r.phonetic, "/laɪk/");
        assert_eq!(r.definition, "similar to");
        assert_eq!(r.translation, "喜欢\\n像");
        assert_eq!(r.bnc, "25");
    }

    #[test]
    fn header_row_is_not_a_record() {
        let records = read_records(reader_from(HEADER));
        assert!(records.is_empty());
    }
}
