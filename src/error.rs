/// Error taxonomy for the quiz.
///
/// Fatal conditions (unreadable catalog, missing artwork, too few activities)
/// abort before or during the main loop; `MalformedRecord` is only ever
/// logged by the catalog loader and truncates the load.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("cannot open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("missing asset {}: {reason}", path.display())]
    AssetMissing { path: PathBuf, reason: String },
    #[error("catalog holds {count} activities, at least 2 are needed")]
    CatalogTooSmall { count: usize },
    #[error("ledger: {0}")]
    Ledger(io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
