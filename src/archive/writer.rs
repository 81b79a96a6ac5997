use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};

use super::structures::{ArchiveOptions, DuplicatePolicy, ZipStream};

/// Size of the chunks copied from a source file into an entry
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Sources at or above this size need ZIP64 headers
const LARGE_FILE_THRESHOLD: u64 = u32::MAX as u64;

/// An archive under construction, backed by an in-memory buffer.
///
/// The sink has exclusive access to the buffer until [`seal`](Self::seal)
/// consumes it; dropping an unsealed sink discards the partial archive.
pub struct ArchiveSink {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    duplicates: DuplicatePolicy,
    written: HashSet<String>,
}

impl ArchiveSink {
    pub fn new(options: &ArchiveOptions) -> Self {
        let file_options = SimpleFileOptions::default()
            .compression_method(options.level.method())
            .compression_level(options.level.deflate_level());

        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: file_options,
            duplicates: options.duplicates,
            written: HashSet::new(),
        }
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> usize {
        self.written.len()
    }

    /// Compress everything `source` yields into a new entry named `entry_path`.
    ///
    /// `source_path` is only used for error reporting. Returns `false` when the
    /// entry was skipped as a duplicate.
    pub async fn add_entry<R>(
        &mut self,
        source_path: &Path,
        mut source: R,
        len: u64,
        entry_path: &str,
    ) -> Result<bool>
    where
        R: AsyncRead + Unpin,
    {
        if self.written.contains(entry_path) {
            return match self.duplicates {
                DuplicatePolicy::Skip => {
                    warn!(entry = entry_path, source = %source_path.display(), "duplicate entry skipped");
                    Ok(false)
                }
                DuplicatePolicy::Reject => Err(Error::DuplicateEntry(entry_path.to_string())),
            };
        }

        let options = self.options.large_file(len >= LARGE_FILE_THRESHOLD);
        self.writer.start_file(entry_path, options)?;

        let mut buf = vec![0u8; COPY_CHUNK_SIZE];
        let mut copied = 0u64;
        loop {
            let n = source
                .read(&mut buf)
                .await
                .map_err(|e| Error::io(source_path, e))?;
            if n == 0 {
                break;
            }
            self.writer.write_all(&buf[..n]).map_err(Error::Sink)?;
            copied += n as u64;
        }

        debug!(entry = entry_path, bytes = copied, "entry written");
        self.written.insert(entry_path.to_string());
        Ok(true)
    }

    /// Finalize the central directory and hand back the buffer at offset 0
    pub fn seal(self) -> Result<ZipStream> {
        let mut stream = self.writer.finish()?;
        stream.set_position(0);
        Ok(stream)
    }
}
