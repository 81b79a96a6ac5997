use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::io::{FileSystem, LocalFileSystem};

use super::check_cancelled;
use super::filter::retain_existing;
use super::structures::{
    ArchiveOptions, CompressionLevel, DirectoryHandle, DuplicatePolicy, FileHandle, Handle,
    WalkMode, ZipStream,
};
use super::walker::TreeWalker;
use super::writer::ArchiveSink;

/// Builds ZIP archives in memory from files or directory trees.
///
/// Every operation works on a private [`ArchiveSink`], writes entries strictly
/// in input order and checks the cancellation token on entry and before each
/// entry. A cancelled or failed build returns an error and no archive.
pub struct ZipBuilder<F: FileSystem> {
    fs: Arc<F>,
    options: ArchiveOptions,
}

impl ZipBuilder<LocalFileSystem> {
    /// Builder reading from the local disk with default options
    pub fn local() -> Self {
        Self::new(Arc::new(LocalFileSystem::new()))
    }
}

impl<F: FileSystem> ZipBuilder<F> {
    pub fn new(fs: Arc<F>) -> Self {
        Self::with_options(fs, ArchiveOptions::default())
    }

    pub fn with_options(fs: Arc<F>, options: ArchiveOptions) -> Self {
        Self { fs, options }
    }

    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.options.level = level;
        self
    }

    pub fn walk_mode(mut self, mode: WalkMode) -> Self {
        self.options.walk_mode = mode;
        self
    }

    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.options.duplicates = policy;
        self
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Archive `files` as top-level entries named by their base names and
    /// return the archive bytes.
    ///
    /// Returns an empty vector when none of the files exist.
    pub async fn files_to_bytes<I>(&self, files: I, cancel: &CancellationToken) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = FileHandle>,
    {
        let stream = self.files_to_stream(files, cancel).await?;
        Ok(stream.into_inner())
    }

    /// Archive `files` as top-level entries and return the archive as a stream
    /// positioned at offset 0.
    ///
    /// Returns a zero-length stream when none of the files exist.
    pub async fn files_to_stream<I>(&self, files: I, cancel: &CancellationToken) -> Result<ZipStream>
    where
        I: IntoIterator<Item = FileHandle>,
    {
        check_cancelled(cancel)?;
        let files = retain_existing(self.fs.as_ref(), files.into_iter().collect::<Vec<_>>()).await;
        if files.is_empty() {
            debug!("no existing files to archive");
            return Ok(ZipStream::default());
        }

        let mut sink = ArchiveSink::new(&self.options);
        for file in &files {
            check_cancelled(cancel)?;
            let source = self
                .fs
                .open(file.path())
                .await
                .map_err(|e| Error::io(file.path(), e))?;
            sink.add_entry(file.path(), source.reader, source.len, &file.name())
                .await?;
            tokio::task::yield_now().await;
        }

        self.finish(sink)
    }

    /// Archive each directory tree under its own base name and return the
    /// archive as a stream positioned at offset 0.
    ///
    /// Returns a zero-length stream when none of the directories exist.
    pub async fn directories_to_stream<I>(&self, directories: I, cancel: &CancellationToken) -> Result<ZipStream>
    where
        I: IntoIterator<Item = DirectoryHandle>,
    {
        check_cancelled(cancel)?;
        let directories =
            retain_existing(self.fs.as_ref(), directories.into_iter().collect::<Vec<_>>()).await;
        if directories.is_empty() {
            debug!("no existing directories to archive");
            return Ok(ZipStream::default());
        }

        let walker = TreeWalker::new(self.fs.as_ref(), cancel, self.options.walk_mode);
        let mut sink = ArchiveSink::new(&self.options);
        for dir in &directories {
            check_cancelled(cancel)?;
            let root = self.named_root(dir).await?;
            walker.add_directory(&mut sink, &root, "").await?;
        }

        self.finish(sink)
    }

    /// Same as [`directories_to_stream`](Self::directories_to_stream), copied
    /// out into a byte vector.
    pub async fn directories_to_bytes<I>(&self, directories: I, cancel: &CancellationToken) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = DirectoryHandle>,
    {
        let stream = self.directories_to_stream(directories, cancel).await?;
        Ok(stream.into_inner())
    }

    /// Roots such as `.` have no final segment; resolve them so their
    /// entries still get a directory name.
    async fn named_root(&self, dir: &DirectoryHandle) -> Result<DirectoryHandle> {
        if dir.path().file_name().is_some() {
            return Ok(dir.clone());
        }
        let resolved = self
            .fs
            .canonicalize(dir.path())
            .await
            .map_err(|e| Error::io(dir.path(), e))?;
        Ok(DirectoryHandle::new(resolved))
    }

    fn finish(&self, sink: ArchiveSink) -> Result<ZipStream> {
        let entries = sink.entry_count();
        let stream = sink.seal()?;
        info!(
            entries,
            bytes = stream.get_ref().len(),
            level = %self.options.level,
            "archive sealed"
        );
        Ok(stream)
    }
}
