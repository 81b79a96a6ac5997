mod local;

pub use local::LocalFileSystem;

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

use crate::archive::{DirectoryHandle, EntryKind, FileHandle};

/// An opened source file ready to be copied into an archive entry
pub struct SourceFile {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub len: u64,
}

/// Trait for the filesystem queries the archive builder depends on
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Check whether `path` exists as an entry of the given kind, right now
    async fn exists(&self, path: &Path, kind: EntryKind) -> bool;

    /// All files below `dir` at any depth, depth-first with siblings sorted by name
    async fn list_files_recursive(&self, dir: &Path) -> io::Result<Vec<FileHandle>>;

    /// All directories below `dir` at any depth, `dir` itself excluded
    async fn list_directories_recursive(&self, dir: &Path) -> io::Result<Vec<DirectoryHandle>>;

    /// Files directly inside `dir`, sorted by name
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<FileHandle>>;

    /// Directories directly inside `dir`, sorted by name
    async fn list_directories(&self, dir: &Path) -> io::Result<Vec<DirectoryHandle>>;

    /// Open a file for reading
    async fn open(&self, path: &Path) -> io::Result<SourceFile>;

    /// Resolve a path to an absolute form with a usable final segment
    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }
}
