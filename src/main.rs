//! Thin CLI over the indexer and search engine: build the two index files
//! from a corpus CSV, then query them. Terminal presentation beyond plain
//! line output lives outside this crate.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use cidian::{build_indices, Dictionary};

#[derive(Parser)]
#[command(name = "cidian", about = "Bidirectional English-Chinese dictionary index")]
struct Cli {
    /// Word index database (word -> entry).
    #[arg(long, default_value = "english_chinese.db")]
    word_db: PathBuf,

    /// Gloss index database (Chinese fragment -> ranked words).
    #[arg(long, default_value = "chinese_english.db")]
    gloss_db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build both indices from a corpus CSV (wholesale rebuild).
    Build {
        corpus: PathBuf,
        /// Overwrite existing index files.
        #[arg(long)]
        force: bool,
    },
    /// Tiered search; queries with Han characters hit the gloss index.
    Search { query: String },
    /// Point lookup of a word entry.
    Word { word: String },
    /// Point lookup of a gloss and its ranked candidates.
    Gloss { gloss: String },
    /// Sample random common words.
    Random {
        #[arg(default_value_t = 20)]
        count: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cidian=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!(error = %e, "aborted");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build { corpus, force } => {
            if !force && (cli.word_db.exists() || cli.gloss_db.exists()) {
                return Err("index files already exist, pass --force to rebuild".into());
            }
            let _ = std::fs::remove_file(&cli.word_db);
            let _ = std::fs::remove_file(&cli.gloss_db);

            match build_indices(&corpus, &cli.word_db, &cli.gloss_db) {
                Ok(summary) => {
                    println!(
                        "built {} word rows and {} gloss rows",
                        summary.word_rows, summary.gloss_rows
                    );
                }
                Err(e) => {
                    // A failed build must not leave a partially-usable index.
                    let _ = std::fs::remove_file(&cli.word_db);
                    let _ = std::fs::remove_file(&cli.gloss_db);
                    return Err(e.into());
                }
            }
        }
        Command::Search { query } => {
            let dict = Dictionary::open(&cli.word_db, &cli.gloss_db)?;
            for key in dict.search(&query) {
                println!("{key}");
            }
        }
        Command::Word { word } => {
            let dict = Dictionary::open(&cli.word_db, &cli.gloss_db)?;
            match dict.lookup_word(&word) {
                Some(entry) => {
                    println!("{}", entry.word);
                    if !entry.phonetic.is_empty() {
                        println!("{}", entry.phonetic);
                    }
                    println!("{}", entry.definition);
                    println!("{}", entry.translation);
                    if !entry.bnc.is_empty() {
                        println!("bnc {}", entry.bnc);
                    }
                }
                None => println!("not found: {word}"),
            }
        }
        Command::Gloss { gloss } => {
            let dict = Dictionary::open(&cli.word_db, &cli.gloss_db)?;
            match dict.lookup_gloss(&gloss) {
                Some(entry) => {
                    for segment in entry.segments() {
                        println!("{segment}");
                    }
                }
                None => println!("not found: {gloss}"),
            }
        }
        Command::Random { count } => {
            let dict = Dictionary::open(&cli.word_db, &cli.gloss_db)?;
            for word in dict.random_words(count) {
                println!("{word}");
            }
        }
    }
    Ok(())
}
