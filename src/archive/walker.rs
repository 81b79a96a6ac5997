//! Directory tree to archive entry mapping.
//!
//! Every walked root contributes entries under its own base name. The
//! [`WalkMode`] decides how nested directories are visited; see its docs for
//! the resulting entry layouts.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{Error, Result};
use crate::io::FileSystem;

use super::check_cancelled;
use super::filter::retain_existing;
use super::structures::{DirectoryHandle, FileHandle, Handle, WalkMode, join_entry_path};
use super::writer::ArchiveSink;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Writes directory trees into an [`ArchiveSink`]
pub struct TreeWalker<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    cancel: &'a CancellationToken,
    mode: WalkMode,
}

impl<'a, F: FileSystem + ?Sized> TreeWalker<'a, F> {
    pub fn new(fs: &'a F, cancel: &'a CancellationToken, mode: WalkMode) -> Self {
        Self { fs, cancel, mode }
    }

    /// Add `dir` and everything below it, with entry paths starting at `prefix`.
    ///
    /// Files land at `<prefix>/<dir name>/<file name>` (without the leading
    /// `<prefix>/` when the prefix is empty). Subdirectories are then visited
    /// with `<prefix>/<dir name>` as their prefix.
    pub fn add_directory<'b>(
        &'b self,
        sink: &'b mut ArchiveSink,
        dir: &'b DirectoryHandle,
        prefix: &'b str,
    ) -> WalkFuture<'b> {
        Box::pin(async move {
            let dir_name = dir.name();
            let dir_path = join_entry_path(prefix, &dir_name);
            trace!(dir = %dir.path().display(), entry_prefix = %dir_path, "walking directory");

            let files = match self.mode {
                WalkMode::Replicate => self.fs.list_files_recursive(dir.path()).await,
                WalkMode::Mirror => self.fs.list_files(dir.path()).await,
            }
            .map_err(|e| Error::io(dir.path(), e))?;
            let files: Vec<FileHandle> = retain_existing(self.fs, files).await;

            for file in &files {
                check_cancelled(self.cancel)?;
                let entry_path = join_entry_path(&dir_path, &file.name());
                self.write_file(sink, file, &entry_path).await?;
            }

            let subdirs = match self.mode {
                WalkMode::Replicate => self.fs.list_directories_recursive(dir.path()).await,
                WalkMode::Mirror => self.fs.list_directories(dir.path()).await,
            }
            .map_err(|e| Error::io(dir.path(), e))?;
            let subdirs: Vec<DirectoryHandle> = retain_existing(self.fs, subdirs).await;

            for subdir in &subdirs {
                check_cancelled(self.cancel)?;
                self.add_directory(sink, subdir, &dir_path).await?;
            }

            Ok(())
        })
    }

    async fn write_file(&self, sink: &mut ArchiveSink, file: &FileHandle, entry_path: &str) -> Result<()> {
        let source = self
            .fs
            .open(file.path())
            .await
            .map_err(|e| Error::io(file.path(), e))?;
        sink.add_entry(file.path(), source.reader, source.len, entry_path)
            .await?;
        tokio::task::yield_now().await;
        Ok(())
    }
}
