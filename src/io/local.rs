use super::{FileSystem, SourceFile};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

use crate::archive::{DirectoryHandle, EntryKind, FileHandle};

/// Filesystem access backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Walk `dir` on the blocking pool and keep the entries `keep` accepts.
    async fn walk<T, K>(dir: &Path, keep: K) -> io::Result<Vec<T>>
    where
        T: Send + 'static,
        K: Fn(&walkdir::DirEntry) -> Option<T> + Send + 'static,
    {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            for entry in WalkDir::new(&dir).min_depth(1).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                if let Some(item) = keep(&entry) {
                    out.push(item);
                }
            }
            Ok(out)
        })
        .await
        .map_err(io::Error::other)?
    }

    /// Immediate children of `dir` accepted by `keep`, sorted by file name.
    ///
    /// Classified like the recursive walk: symlinked directories are not
    /// directories, symlinks to files are files.
    async fn children<T, K>(dir: &Path, keep: K) -> io::Result<Vec<T>>
    where
        K: Fn(PathBuf, EntryKind) -> Option<T>,
    {
        let mut read_dir = fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            paths.push(entry.path());
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut out = Vec::with_capacity(paths.len());
        for path in paths {
            // Entries removed since read_dir are skipped rather than failing the listing
            let Ok(link_meta) = fs::symlink_metadata(&path).await else {
                continue;
            };
            let kind = if link_meta.is_dir() {
                EntryKind::Directory
            } else if fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                EntryKind::File
            } else {
                continue;
            };
            if let Some(item) = keep(path, kind) {
                out.push(item);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path, kind: EntryKind) -> bool {
        match fs::metadata(path).await {
            Ok(meta) => match kind {
                EntryKind::File => meta.is_file(),
                EntryKind::Directory => meta.is_dir(),
            },
            Err(_) => false,
        }
    }

    async fn list_files_recursive(&self, dir: &Path) -> io::Result<Vec<FileHandle>> {
        // Symlinked directories are not followed, but a symlink to a file counts as a file
        Self::walk(dir, |entry| {
            let path = entry.path();
            (!entry.file_type().is_dir() && path.is_file()).then(|| FileHandle::new(path))
        })
        .await
    }

    async fn list_directories_recursive(&self, dir: &Path) -> io::Result<Vec<DirectoryHandle>> {
        Self::walk(dir, |entry| {
            entry
                .file_type()
                .is_dir()
                .then(|| DirectoryHandle::new(entry.path()))
        })
        .await
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<FileHandle>> {
        Self::children(dir, |path, kind| {
            (kind == EntryKind::File).then(|| FileHandle::new(path))
        })
        .await
    }

    async fn list_directories(&self, dir: &Path) -> io::Result<Vec<DirectoryHandle>> {
        Self::children(dir, |path, kind| {
            (kind == EntryKind::Directory).then(|| DirectoryHandle::new(path))
        })
        .await
    }

    async fn open(&self, path: &Path) -> io::Result<SourceFile> {
        let file = fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok(SourceFile {
            reader: Box::new(file),
            len,
        })
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Handle;

    fn names<H: Handle>(root: &Path, handles: &[H]) -> Vec<String> {
        handles
            .iter()
            .map(|h| {
                h.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b/inner")).unwrap();
        std::fs::create_dir_all(root.join("a")).unwrap();
        std::fs::write(root.join("z.txt"), b"z").unwrap();
        std::fs::write(root.join("a/one.txt"), b"1").unwrap();
        std::fs::write(root.join("b/inner/two.txt"), b"2").unwrap();
        dir
    }

    #[tokio::test]
    async fn recursive_listing_is_depth_first_and_sorted() {
        let dir = tree();
        let fs = LocalFileSystem::new();

        let files = fs.list_files_recursive(dir.path()).await.unwrap();
        assert_eq!(names(dir.path(), &files), vec!["a/one.txt", "b/inner/two.txt", "z.txt"]);

        let dirs = fs.list_directories_recursive(dir.path()).await.unwrap();
        assert_eq!(names(dir.path(), &dirs), vec!["a", "b", "b/inner"]);
    }

    #[tokio::test]
    async fn immediate_listing_stays_on_one_level() {
        let dir = tree();
        let fs = LocalFileSystem::new();

        let files = fs.list_files(dir.path()).await.unwrap();
        assert_eq!(names(dir.path(), &files), vec!["z.txt"]);

        let dirs = fs.list_directories(dir.path()).await.unwrap();
        assert_eq!(names(dir.path(), &dirs), vec!["a", "b"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_directories_are_not_descended() {
        let dir = tree();
        let root = dir.path();
        std::os::unix::fs::symlink(root, root.join("a/loop")).unwrap();
        std::os::unix::fs::symlink(root.join("z.txt"), root.join("a/z-link.txt")).unwrap();
        let fs = LocalFileSystem::new();

        let files = fs.list_files_recursive(root).await.unwrap();
        assert_eq!(
            names(root, &files),
            vec!["a/one.txt", "a/z-link.txt", "b/inner/two.txt", "z.txt"]
        );
        let dirs = fs.list_directories(&root.join("a")).await.unwrap();
        assert!(dirs.is_empty());
        let files = fs.list_files(&root.join("a")).await.unwrap();
        assert_eq!(names(root, &files), vec!["a/one.txt", "a/z-link.txt"]);
    }

    #[tokio::test]
    async fn open_reports_length() {
        let dir = tree();
        let source = LocalFileSystem::new().open(&dir.path().join("z.txt")).await.unwrap();
        assert_eq!(source.len, 1);
        assert!(LocalFileSystem::new().open(&dir.path().join("missing")).await.is_err());
    }
}
