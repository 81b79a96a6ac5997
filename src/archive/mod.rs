//! In-memory ZIP archive construction.
//!
//! ## Architecture
//!
//! - [`structures`]: handles, compression levels and build options
//! - [`filter`]: drops handles that no longer exist
//! - [`writer`]: the [`ArchiveSink`] wrapping the ZIP codec
//! - [`walker`]: maps directory trees onto entry paths
//! - [`builder`]: the public [`ZipBuilder`] operations
//!
//! ## Entry paths
//!
//! Entry paths always use `/`. Files given directly become top-level entries
//! named by their base name. Files found under a walked directory start with
//! that directory's base name, e.g. walking `/data/photos` yields
//! `photos/beach.jpg`.
//!
//! ## Limitations
//!
//! - Empty directories produce no entries
//! - The ZIP codec refuses duplicate names, so a second entry with the same
//!   path is skipped or rejected according to [`DuplicatePolicy`]

mod builder;
mod filter;
mod structures;
mod walker;
mod writer;

pub use builder::ZipBuilder;
pub use filter::retain_existing;
pub use structures::*;
pub use walker::TreeWalker;
pub use writer::ArchiveSink;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

pub(crate) fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
