//! # mkzip
//!
//! Build ZIP archives in memory from files and directory trees.
//!
//! The library takes filesystem paths, keeps the ones that still exist, maps
//! directory hierarchies onto archive entry paths and returns the finished
//! archive either as a byte vector or as a seekable stream positioned at its
//! start.
//!
//! ## Features
//!
//! - Flat archives from a list of files, one top-level entry per file
//! - Recursive archives from directory trees, rooted at each directory's name
//! - Stored or DEFLATE entries at a uniform compression level
//! - Cooperative cancellation through a [`CancellationToken`]
//! - Pluggable filesystem access via the [`FileSystem`] trait
//!
//! ## Example
//!
//! ```no_run
//! use mkzip::{CancellationToken, CompressionLevel, DirectoryHandle, FileHandle, ZipBuilder};
//!
//! #[tokio::main]
//! async fn main() -> mkzip::Result<()> {
//!     let cancel = CancellationToken::new();
//!     let builder = ZipBuilder::local().level(CompressionLevel::Fastest);
//!
//!     // Two top-level entries: `notes.txt` and `report.csv`
//!     let bytes = builder
//!         .files_to_bytes([FileHandle::new("notes.txt"), FileHandle::new("out/report.csv")], &cancel)
//!         .await?;
//!     println!("{} bytes", bytes.len());
//!
//!     // Every file under `assets/` becomes `assets/...`
//!     let stream = builder
//!         .directories_to_stream([DirectoryHandle::new("assets")], &cancel)
//!         .await?;
//!     println!("{} bytes", stream.get_ref().len());
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod error;
pub mod io;

pub use archive::{
    ArchiveOptions, CompressionLevel, DirectoryHandle, DuplicatePolicy, FileHandle, Handle,
    WalkMode, ZipBuilder, ZipStream,
};
pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{FileSystem, LocalFileSystem, SourceFile};
pub use tokio_util::sync::CancellationToken;
