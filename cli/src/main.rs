mod export;
mod import;

use std::env;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use thiserror::Error;

use corpus_backend::db::{corpus, open_corpus_db};
use corpus_backend::aggregate::recompute_subsection_counts;
use corpus_backend::pipeline::ImportOptions;
use corpus_backend::exporter::ExportOptions;
use corpus_backend::{get_corpus_db_path, get_create_corpus_dir, logger};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Directory does not exist or is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("{0} export files could not be written, see the log for details")]
    ExportIncomplete(usize),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Hadith corpus import and export", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Folder of the per-language JSON documents and log.txt.
    /// If not provided, the CORPUS_DIR environment variable will be used.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "CORPUS_DIR")]
    corpus_dir: Option<PathBuf>,

    /// SQLite database file. Defaults to hadith.sqlite3 in the corpus folder.
    #[arg(long, global = true, value_name = "FILE_PATH", env = "CORPUS_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import documents, attach subsections and recount them
    Import {
        /// Empty the database first. Import appends, so re-runs need this.
        #[arg(long, default_value_t = false)]
        truncate: bool,

        /// Folder of the *-subsection.json files (default: <corpus-dir>/subsection)
        #[arg(long, value_name = "DIRECTORY_PATH")]
        subsection_dir: Option<PathBuf>,
    },

    /// Write the database back to JSON documents
    #[command(arg_required_else_help = true)]
    Export {
        /// Output folder, created when missing
        #[arg(value_name = "DIRECTORY_PATH")]
        output_dir: PathBuf,
    },

    /// Recompute subsection counts of the top-level sections
    Recount,

    /// Delete all rows from the corpus tables
    Truncate,
}

fn recount(db_path: &Path) -> anyhow::Result<()> {
    let mut conn = open_corpus_db(db_path)?;
    let n = recompute_subsection_counts(&mut conn)?;
    logger::info(&format!("Recounted subsections of {} top-level sections", n));
    println!("Recounted subsections of {} top-level sections", n);
    Ok(())
}

fn truncate(db_path: &Path) -> anyhow::Result<()> {
    let mut conn = open_corpus_db(db_path)?;
    let n = corpus::truncate_corpus(&mut conn)?;
    logger::info(&format!("Truncated corpus tables, {} rows deleted", n));
    println!("Deleted {} rows", n);
    Ok(())
}

fn main() {
    // Attempt to load .env file. This might define CORPUS_DIR if it's not
    // already in the environment. Clap will pick it up via `env = "CORPUS_DIR"`.
    if dotenv().is_err() {
        println!("Info: No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    // The logger and the backend path helpers read the environment, set it
    // before the first log line. Still single threaded here.
    unsafe {
        if env::var("ENABLE_PRINT_LOG").is_err() {
            env::set_var("ENABLE_PRINT_LOG", "true");
        }
        if let Some(p) = &cli.corpus_dir {
            env::set_var("CORPUS_DIR", p);
        }
        if let Some(p) = &cli.db {
            env::set_var("CORPUS_DB_PATH", p);
        }
    }

    // Determine the corpus directory
    // Precedence:
    // - given with --corpus-dir
    // - set with env var CORPUS_DIR
    // - get_create_corpus_dir()
    let corpus_dir = match cli.corpus_dir {
        Some(path) => path,
        None => match get_create_corpus_dir() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to get corpus directory: {}", e);
                eprintln!("Use the --corpus-dir option or set the CORPUS_DIR environment variable.");
                exit(1);
            }
        },
    };

    if !corpus_dir.is_dir() {
        eprintln!("Error: {}", CliError::NotADirectory(corpus_dir));
        exit(1);
    }

    let db_path = match cli.db {
        Some(path) => path,
        None => match get_corpus_db_path() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to get database path: {}", e);
                exit(1);
            }
        },
    };

    // === Execute the requested command ===

    let command_result = match cli.command {
        Commands::Import { truncate, subsection_dir } => {
            let mut options = ImportOptions::new(&corpus_dir);
            options.truncate_first = truncate;
            if let Some(dir) = subsection_dir {
                options.subsection_dir = dir;
            }
            import::import_corpus(&db_path, options).map(|_| ())
        }

        Commands::Export { output_dir } => {
            export::export_corpus(&db_path, ExportOptions::new(output_dir)).map(|_| ())
        }

        Commands::Recount => recount(&db_path),

        Commands::Truncate => truncate(&db_path),
    };

    if let Err(e) = command_result {
        logger::error(&format!("{:#}", e));
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
