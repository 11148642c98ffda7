//! Minimal CLI driver for the probe and search modules.
//!
//! The real host is a file manager; this binary exists so the library can
//! be exercised and demonstrated from a shell without one. It is
//! deliberately thin — no preferences, no query language, just enough
//! surface to drive `fsprobe::probe_path` and `fsprobe::spawn_search`.
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};

use fsprobe::{SearchHit, SearchHitSink};

#[derive(Parser)]
#[command(author, version, about = "probe mounts and search an external indexer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a path answers a metadata call within a timeout.
    Probe {
        path: PathBuf,
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
    },

    /// Run an external indexer (`sc`) and print matching paths.
    Search {
        query: String,
        #[arg(long, default_value = "sc")]
        indexer: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe { path, timeout_ms } => {
            let responsive = fsprobe::probe_path(&path, Duration::from_millis(timeout_ms));
            if responsive {
                println!("{}: responsive", path.display());
            } else {
                println!("{}: unresponsive", path.display());
                std::process::exit(1);
            }
        }
        Commands::Search { query, indexer } => {
            let sink = Arc::new(PrintingSink::default());
            let handle = fsprobe::spawn_search(&indexer, &query, Arc::clone(&sink));
            handle.join();
            if let Some(err) = sink.error.lock().unwrap().take() {
                eprintln!("search failed: {err}");
                std::process::exit(1);
            }
        }
    }
}

#[derive(Default)]
struct PrintingSink {
    error: Mutex<Option<String>>,
}

impl SearchHitSink for Arc<PrintingSink> {
    fn hits_added(&self, hits: Vec<SearchHit>) {
        for hit in hits {
            match hit.score {
                Some(score) => println!("{}\t{:.2}", hit.path, score),
                None => println!("{}", hit.path),
            }
        }
    }

    fn finished(&self) {}

    fn error(&self, message: String) {
        *self.error.lock().unwrap() = Some(message);
    }
}
