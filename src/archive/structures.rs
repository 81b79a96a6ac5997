use std::borrow::Cow;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::Compression;
use zip::CompressionMethod;

/// A finished archive: an in-memory, seekable stream positioned at offset 0.
///
/// The caller owns it; dropping it releases the buffer.
pub type ZipStream = Cursor<Vec<u8>>;

/// Kind of filesystem entry a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Common behavior of [`FileHandle`] and [`DirectoryHandle`]
pub trait Handle {
    const KIND: EntryKind;

    fn path(&self) -> &Path;

    /// Final path segment, used to build archive entry paths
    fn name(&self) -> Cow<'_, str> {
        self.path()
            .file_name()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    }
}

/// A regular file identified by its path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    path: PathBuf,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Handle for FileHandle {
    const KIND: EntryKind = EntryKind::File;

    fn path(&self) -> &Path {
        &self.path
    }
}

/// A directory identified by its path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryHandle {
    path: PathBuf,
}

impl DirectoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Handle for DirectoryHandle {
    const KIND: EntryKind = EntryKind::Directory;

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Compression applied uniformly to every entry of one archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Entries are stored without compression
    NoCompression,
    Fastest,
    /// Balance between speed and ratio
    #[default]
    Optimal,
    SmallestSize,
}

impl CompressionLevel {
    /// ZIP compression method for this level
    pub fn method(&self) -> CompressionMethod {
        match self {
            CompressionLevel::NoCompression => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        }
    }

    /// DEFLATE level handed to the codec; `None` for stored entries
    pub fn deflate_level(&self) -> Option<i64> {
        let compression = match self {
            CompressionLevel::NoCompression => return None,
            CompressionLevel::Fastest => Compression::fast(),
            CompressionLevel::Optimal => Compression::default(),
            CompressionLevel::SmallestSize => Compression::best(),
        };
        Some(i64::from(compression.level()))
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "store" | "0" => Ok(CompressionLevel::NoCompression),
            "fastest" | "fast" | "1" => Ok(CompressionLevel::Fastest),
            "optimal" | "default" | "6" => Ok(CompressionLevel::Optimal),
            "smallest" | "best" | "9" => Ok(CompressionLevel::SmallestSize),
            other => Err(format!(
                "unknown compression level '{other}' (expected none, fastest, optimal or smallest)"
            )),
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionLevel::NoCompression => "none",
            CompressionLevel::Fastest => "fastest",
            CompressionLevel::Optimal => "optimal",
            CompressionLevel::SmallestSize => "smallest",
        };
        f.write_str(name)
    }
}

/// How the tree walker maps a directory hierarchy onto entry paths.
///
/// Given `D/a.txt` and `D/sub/b.txt`:
///
/// - `Replicate` lists files at every depth on every level of recursion and
///   names them after the directory being visited, so deeper files are written
///   once per ancestor: `D/a.txt`, `D/b.txt`, `D/sub/b.txt`.
/// - `Mirror` visits immediate children only and yields one entry per file at
///   its real relative path: `D/a.txt`, `D/sub/b.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMode {
    #[default]
    Replicate,
    Mirror,
}

/// What the archive sink does when an entry path is written twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first entry, log and skip later ones
    #[default]
    Skip,
    /// Fail the build with [`Error::DuplicateEntry`](crate::Error::DuplicateEntry)
    Reject,
}

/// Settings for one archive-building operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveOptions {
    pub level: CompressionLevel,
    pub walk_mode: WalkMode,
    pub duplicates: DuplicatePolicy,
}

/// Append `name` to an entry path prefix using `/` as separator
pub fn join_entry_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_without_prefix_is_bare_name() {
        assert_eq!(join_entry_path("", "a.txt"), "a.txt");
        assert_eq!(join_entry_path("root/sub", "a.txt"), "root/sub/a.txt");
    }

    #[test]
    fn handle_name_is_final_segment() {
        let file = FileHandle::new("/tmp/some/dir/report.csv");
        assert_eq!(file.name(), "report.csv");

        let dir = DirectoryHandle::new("relative/photos");
        assert_eq!(dir.name(), "photos");
        assert_eq!(DirectoryHandle::new("/").name(), "");
    }

    #[test]
    fn stored_level_has_no_deflate_setting() {
        assert_eq!(CompressionLevel::NoCompression.method(), CompressionMethod::Stored);
        assert_eq!(CompressionLevel::NoCompression.deflate_level(), None);
        assert_eq!(CompressionLevel::Fastest.deflate_level(), Some(1));
        assert_eq!(CompressionLevel::Optimal.deflate_level(), Some(6));
        assert_eq!(CompressionLevel::SmallestSize.deflate_level(), Some(9));
    }

    #[test]
    fn parse_level_names() {
        assert_eq!("Fastest".parse::<CompressionLevel>(), Ok(CompressionLevel::Fastest));
        assert_eq!("store".parse::<CompressionLevel>(), Ok(CompressionLevel::NoCompression));
        assert_eq!("9".parse::<CompressionLevel>(), Ok(CompressionLevel::SmallestSize));
        assert!("ultra".parse::<CompressionLevel>().is_err());
        assert_eq!(CompressionLevel::default().to_string(), "optimal");
    }
}
