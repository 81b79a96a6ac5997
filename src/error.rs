use std::io;
use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure outcomes of an archive build.
///
/// A failed build never yields a partial archive: the in-progress sink is
/// dropped on every error path.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller's cancellation token fired before the archive was sealed
    #[error("archive build cancelled")]
    Cancelled,

    /// A source file or directory could not be read, including one that
    /// vanished after the existence check
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive codec rejected an operation
    #[error("zip codec error: {0}")]
    Zip(#[from] ZipError),

    /// Writing into the in-memory archive sink failed
    #[error("archive sink write failed: {0}")]
    Sink(#[source] io::Error),

    /// Two entries resolved to the same archive path under `DuplicatePolicy::Reject`
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
