//! Index construction: one SQLite database per direction.
//! `words` maps source word -> full entry, `glosses` maps Chinese fragment ->
//! ranked source words. Both are built wholesale from the corpus and treated
//! as read-only afterwards.

pub mod glosses;
pub mod words;

use std::path::Path;
use std::time::Instant;

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::corpus::{self, CorpusError};

/// Errors that abort an index build. Anything row-level is skipped inside
/// the builders and never surfaces here.
#[derive(Debug)]
pub enum BuildError {
    Corpus(CorpusError),
    Store(rusqlite::Error),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Corpus(e) => write!(f, "corpus error: {e}"),
            BuildError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<CorpusError> for BuildError {
    fn from(e: CorpusError) -> Self {
        BuildError::Corpus(e)
    }
}

impl From<rusqlite::Error> for BuildError {
    fn from(e: rusqlite::Error) -> Self {
        BuildError::Store(e)
    }
}

/// Row counts from a completed build.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BuildSummary {
    pub word_rows: u64,
    pub gloss_rows: u64,
}

/// Open (or create) an index database with the write-path pragmas.
pub(crate) fn open_store(db_path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(db_path)?;
    // WAL keeps readers unblocked while a build is running.
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    Ok(conn)
}

/// Build both indices from one corpus pass. The corpus is read fully into
/// memory first: the gloss index cannot rank a candidate list until every
/// word mapping to that gloss has been seen.
pub fn build_indices(
    corpus_path: &Path,
    word_db: &Path,
    gloss_db: &Path,
) -> Result<BuildSummary, BuildError> {
    let start = Instant::now();
    let records = corpus::read_corpus(corpus_path)?;

    let word_rows = words::build(word_db, &records)?;
    let gloss_rows = glosses::build(gloss_db, &records)?;

    let summary = BuildSummary {
        word_rows,
        gloss_rows,
    };
    info!(
        word_rows,
        gloss_rows,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "index build complete"
    );
    Ok(summary)
}
