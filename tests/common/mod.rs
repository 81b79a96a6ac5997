#![allow(dead_code)]

use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mkzip::archive::EntryKind;
use mkzip::{CancellationToken, DirectoryHandle, FileHandle, FileSystem, LocalFileSystem, SourceFile};
use zip::ZipArchive;

/// Entry names of an archive, in central directory order.
pub fn entry_names<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Vec<String> {
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Decompressed content of a named entry.
pub fn entry_content<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Vec<u8> {
    let mut entry = archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("missing entry {name}: {e}"));
    let mut out = Vec::new();
    entry.read_to_end(&mut out).unwrap();
    out
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Local filesystem with knobs for simulating races and interruptions.
#[derive(Default)]
pub struct ScriptedFs {
    inner: LocalFileSystem,
    /// Report every path as existing, even after it was removed
    pub stale_exists: bool,
    /// Cancel this token once `open` has been called this many times
    pub cancel_after_opens: Option<(CancellationToken, usize)>,
    opens: AtomicUsize,
}

impl ScriptedFs {
    pub fn stale() -> Self {
        Self {
            stale_exists: true,
            ..Default::default()
        }
    }

    pub fn cancelling(token: CancellationToken, after_opens: usize) -> Self {
        Self {
            cancel_after_opens: Some((token, after_opens)),
            ..Default::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileSystem for ScriptedFs {
    async fn exists(&self, path: &Path, kind: EntryKind) -> bool {
        self.stale_exists || self.inner.exists(path, kind).await
    }

    async fn list_files_recursive(&self, dir: &Path) -> io::Result<Vec<FileHandle>> {
        self.inner.list_files_recursive(dir).await
    }

    async fn list_directories_recursive(&self, dir: &Path) -> io::Result<Vec<DirectoryHandle>> {
        self.inner.list_directories_recursive(dir).await
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<FileHandle>> {
        self.inner.list_files(dir).await
    }

    async fn list_directories(&self, dir: &Path) -> io::Result<Vec<DirectoryHandle>> {
        self.inner.list_directories(dir).await
    }

    async fn open(&self, path: &Path) -> io::Result<SourceFile> {
        let opened = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((token, after)) = &self.cancel_after_opens {
            if opened >= *after {
                token.cancel();
            }
        }
        self.inner.open(path).await
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.inner.canonicalize(path).await
    }
}
