pub mod types;
pub mod errors;
pub mod collection_id;
pub mod documents;
pub mod loader;
pub mod hierarchy;
pub mod aggregate;
pub mod exporter;
pub mod pipeline;
pub mod logger;

pub mod db;

use std::env;
use std::error::Error;
use std::fs::create_dir_all;
use std::path::PathBuf;

use app_dirs::{get_app_root, AppDataType, AppInfo};

pub const APP_INFO: AppInfo = AppInfo { name: "hadith-corpus", author: "hadith-corpus" };

pub static DEFAULT_DB_FILE_NAME: &str = "hadith.sqlite3";

/// Folder of subsection descriptor files, relative to the corpus directory.
pub static SUBSECTION_DIR_NAME: &str = "subsection";

/// Folder summaries are exported to, relative to the output directory.
pub static SUMMARY_DIR_NAME: &str = "summarized";

/// The corpus working directory: the documents to import, `log.txt`, and the
/// default database location.
///
/// Precedence:
/// - `CORPUS_DIR` environment variable (also set by the CLI `--corpus-dir`)
/// - the platform user data directory, e.g. ~/.local/share/hadith-corpus
pub fn get_create_corpus_dir() -> Result<PathBuf, Box<dyn Error>> {
    let p = match env::var("CORPUS_DIR") {
        Ok(s) if !s.is_empty() => PathBuf::from(s),
        _ => get_app_root(AppDataType::UserData, &APP_INFO)?,
    };
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}

/// `CORPUS_DB_PATH`, or `hadith.sqlite3` in the corpus directory.
pub fn get_corpus_db_path() -> Result<PathBuf, Box<dyn Error>> {
    match env::var("CORPUS_DB_PATH") {
        Ok(s) if !s.is_empty() => Ok(PathBuf::from(s)),
        _ => Ok(get_create_corpus_dir()?.join(DEFAULT_DB_FILE_NAME)),
    }
}
