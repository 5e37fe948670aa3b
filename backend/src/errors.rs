use std::path::PathBuf;

use thiserror::Error;

use crate::types::{CollectionId, Language};

/// Recoverable and fatal conditions of an import or export run.
///
/// Everything except `Storage` and `Database` is recoverable: the pipeline
/// logs it, skips the offending file or descriptor and carries on.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("could not determine collection ID for '{0}'")]
    UnresolvedCollection(String),

    #[error("could not determine language for '{0}'")]
    UnknownLanguage(String),

    #[error("unknown JSON structure in {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("unmatched subsection in {file}: {detail}")]
    UnmatchedSubsection { file: String, detail: String },

    #[error("no top-level sections stored for collection {collection_id} ({language})")]
    MissingTopLevelSections {
        collection_id: CollectionId,
        language: Language,
    },

    #[error("no canonical book name for collection {0}")]
    UnknownCollectionName(CollectionId),

    #[error("storage unavailable at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

impl CorpusError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CorpusError::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
