//! Forward index builder: every corpus record becomes one `words` row.
//! A fixed worker pool pulls record batches off a bounded channel; SQLite
//! allows a single writer, so each worker holds the connection lock for its
//! whole begin -> commit span. Parallelism buys batch preparation and
//! binding, not the write itself.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel as cb;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use super::{open_store, BuildError};
use crate::corpus::DictionaryRecord;

const NUM_WORKERS: usize = 4;
const BATCH_SIZE: usize = 1000;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT NOT NULL,
        phonetic TEXT,
        definition TEXT,
        translation TEXT,
        bnc TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_word ON words(word);
    CREATE INDEX IF NOT EXISTS idx_bnc ON words(CAST(bnc AS INTEGER));
";

const INSERT: &str = "INSERT INTO words (word, phonetic, definition, translation, bnc)
                      VALUES (?1, ?2, ?3, ?4, ?5)";

/// Build the word index. Schema failure is fatal; row-level insert failures
/// are skipped without aborting their batch. Returns rows committed.
pub fn build(db_path: &Path, records: &[DictionaryRecord]) -> Result<u64, BuildError> {
    let conn = open_store(db_path)?;
    conn.execute_batch(SCHEMA)?;

    let db = Mutex::new(conn);
    let committed = AtomicU64::new(0);
    let total = records.len() as u64;

    thread::scope(|scope| {
        let (tx, rx) = cb::bounded::<&[DictionaryRecord]>(NUM_WORKERS);

        for worker in 0..NUM_WORKERS {
            let rx = rx.clone();
            let db = &db;
            let committed = &committed;
            thread::Builder::new()
                .name(format!("word-index-{worker}"))
                .spawn_scoped(scope, move || {
                    for batch in rx.iter() {
                        let inserted = commit_batch(db, batch);
                        let done = committed.fetch_add(inserted, Ordering::Relaxed) + inserted;
                        debug!(done, total, "word index progress");
                    }
                })
                .expect("failed to spawn word index worker");
        }
        drop(rx);

        for chunk in records.chunks(BATCH_SIZE) {
            if tx.send(chunk).is_err() {
                break;
            }
        }
        // Dropping the sender lets the workers drain and exit.
    });

    let rows = committed.load(Ordering::Relaxed);
    info!(rows, path = %db_path.display(), "word index built");
    Ok(rows)
}

/// Insert one batch inside one transaction. Returns rows inserted; any
/// batch-level failure logs and yields 0 so the worker moves on.
fn commit_batch(db: &Mutex<Connection>, batch: &[DictionaryRecord]) -> u64 {
    let mut conn = db.lock();

    let tx = match conn.transaction() {
        Ok(tx) => tx,
        Err(e) => {
            warn!(error = %e, "word batch begin failed");
            return 0;
        }
    };

    let mut inserted = 0u64;
    {
        let mut stmt = match tx.prepare_cached(INSERT) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "word insert prepare failed");
                return 0;
            }
        };
        for record in batch {
            match stmt.execute(params![
                record.word,
                record.phonetic,
                record.definition,
                record.translation,
                record.bnc,
            ]) {
                Ok(_) => inserted += 1,
                Err(e) => debug!(error = %e, word = %record.word, "word insert skipped"),
            }
        }
    }

    match tx.commit() {
        Ok(()) => inserted,
        Err(e) => {
            warn!(error = %e, "word batch commit failed");
            0
        }
    }
}
