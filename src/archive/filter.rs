//! Entry filtering.
//!
//! Handles are checked against the filesystem at the moment of filtering.
//! The result is only a best-effort snapshot: an entry may still disappear
//! before it is read, which then surfaces as [`Error::Io`](crate::Error::Io).

use tracing::debug;

use crate::io::FileSystem;

use super::structures::Handle;

/// Keep the handles that exist right now, in input order.
///
/// Empty input, or input where nothing exists, yields an empty vector.
pub async fn retain_existing<F, H, I>(fs: &F, handles: I) -> Vec<H>
where
    F: FileSystem + ?Sized,
    H: Handle,
    I: IntoIterator<Item = H>,
{
    let mut kept = Vec::new();
    for handle in handles {
        if fs.exists(handle.path(), H::KIND).await {
            kept.push(handle);
        } else {
            debug!(path = %handle.path().display(), kind = ?H::KIND, "skipping missing entry");
        }
    }
    kept
}
