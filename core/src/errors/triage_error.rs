// core/src/errors/triage_error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::triage::Category;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("source root does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("broken output not found at {}; run the broken pass before the relaxed pass", .0.display())]
    BrokenPassMissing(PathBuf),

    #[error("index map {} is not valid json", path.display())]
    IndexMapDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("folder {folder} is already claimed by the {held} category")]
    AlreadyClaimed { folder: String, held: Category },

    #[error("corpus error: {0}")]
    Corpus(#[from] crate::errors::CorpusError),
}
