use super::error::FioError;
use super::handle::FileId;
use super::registry::FileRegistry;
use crate::core::filetype::FileType;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Byte offset of an output file as recorded for a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOffset {
    At(u64),
    /// The file grew past the configured offset limit at some point.
    OutOfRange,
}

impl fmt::Display for FileOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOffset::At(offset) => write!(f, "{}", offset),
            FileOffset::OutOfRange => write!(f, "out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePositionRecord {
    pub path: PathBuf,
    pub offset: FileOffset,
}

impl FileRegistry {
    /// Flushes `id` and returns its byte offset.
    ///
    /// A failing flush is fatal here: the offset would otherwise describe data
    /// that never reached the disk.
    pub fn file_position(&self, id: FileId) -> Result<u64, FioError> {
        let handle = self.handle(id)?;
        let mut handle = handle.lock();
        if handle.is_stdio() {
            return Err(FioError::Stdio { operation: "file positions" });
        }
        let path = handle.display_path();
        handle
            .stream_mut(id)?
            .position()
            .map_err(|source| FioError::Flush { path, source })
    }

    /// Checks the offset of `id` against the configured limit.
    ///
    /// Returns `false` and marks the handle for good once the limit has been
    /// passed; later snapshots report it as [`FileOffset::OutOfRange`].
    pub fn check_offset_range(&self, id: FileId) -> Result<bool, FioError> {
        let offset = self.file_position(id)?;
        if offset <= self.config.offset_limit {
            return Ok(true);
        }
        let handle = self.handle(id)?;
        let mut handle = handle.lock();
        if !handle.offset_out_of_range {
            warn!(
                "Offset {} of '{}' exceeds the offset limit {}; restart positions for it will not be exact.",
                offset,
                handle.path.display(),
                self.config.offset_limit
            );
        }
        handle.offset_out_of_range = true;
        Ok(false)
    }

    /// Offsets of every open output file, for the checkpoint writer.
    ///
    /// Read handles, standard streams and checkpoint files themselves are left
    /// out. Entries come in slot order.
    pub fn snapshot_output_positions(&self) -> Result<Vec<FilePositionRecord>, FioError> {
        let handles: Vec<_> = self
            .table
            .lock()
            .iter()
            .map(|(id, handle)| (id, handle.clone()))
            .collect();

        let mut records = Vec::new();
        for (id, handle) in handles {
            let mut handle = handle.lock();
            if handle.mode.is_read() || handle.is_stdio() || handle.file_type == FileType::Checkpoint {
                continue;
            }
            let path = handle.path.clone();
            if handle.offset_out_of_range {
                records.push(FilePositionRecord {
                    path,
                    offset: FileOffset::OutOfRange,
                });
                continue;
            }
            let offset = handle
                .stream_mut(id)?
                .position()
                .map_err(|source| FioError::Flush {
                    path: path.to_string_lossy().to_string(),
                    source,
                })?;
            let offset = if offset > self.config.offset_limit {
                FileOffset::OutOfRange
            } else {
                FileOffset::At(offset)
            };
            records.push(FilePositionRecord { path, offset });
        }
        Ok(records)
    }
}
