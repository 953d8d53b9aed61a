use super::backup::make_backup;
use super::config::IoConfig;
use super::error::FioError;
use super::handle::{FileHandle, FileId, FileStream, STDIO_NAME, SharedHandle};
use super::session::FileSession;
use crate::core::filetype::{FileType, FormatCategory};
use crate::core::stream::{OpenMode, Stream};
use crate::core::types::Precision;
use parking_lot::{Mutex, RwLock};
use slotmap::SlotMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Table of open handles.
///
/// The table lock is held only while an entry is looked up, inserted or
/// removed; file I/O always happens under the handle's own lock.
#[derive(Debug, Default)]
pub struct FileRegistry {
    pub(super) table: Mutex<SlotMap<FileId, SharedHandle>>,
    pub(super) comment: Arc<RwLock<Option<String>>>,
    pub(super) config: IoConfig,
}

impl FileRegistry {
    pub fn new(config: IoConfig) -> Self {
        Self {
            table: Mutex::new(SlotMap::with_key()),
            comment: Arc::new(RwLock::new(None)),
            config,
        }
    }

    pub fn config(&self) -> &IoConfig {
        &self.config
    }

    /// Opens `path` with the file type implied by its extension.
    pub fn open(&self, path: impl AsRef<Path>, mode: &str) -> Result<FileId, FioError> {
        let path = path.as_ref();
        self.open_as(path, mode, FileType::from_path(path))
    }

    /// Opens `path` as `file_type`, whatever its extension says.
    ///
    /// An existing canonical-binary file opened for writing is first renamed to
    /// a numbered backup when backups are enabled.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), mode = %mode, file_type = %file_type))]
    pub fn open_as(
        &self,
        path: impl AsRef<Path>,
        mode: &str,
        file_type: FileType,
    ) -> Result<FileId, FioError> {
        let path = path.as_ref();
        let mode = parse_mode(mode)?;

        if mode == OpenMode::Write
            && file_type.category() == Some(FormatCategory::CanonicalBinary)
            && self.config.make_backups
        {
            make_backup(path, self.config.max_backups);
        }

        let stream = Stream::open_file(path, mode).map_err(|source| {
            let path = path.to_string_lossy().to_string();
            match mode {
                OpenMode::Read => FioError::OpenForRead { path, source },
                OpenMode::Write | OpenMode::Append => FioError::OpenForWrite { path, source },
            }
        })?;

        let id = self.insert(path.to_path_buf(), file_type, mode, stream);
        info!(%id, "Opened '{}' ({}, mode {}).", path.display(), file_type, mode);
        Ok(id)
    }

    /// Binds standard input (`r`) or standard output (`w`, `a`) as a text handle.
    #[instrument(skip(self))]
    pub fn open_stdio(&self, mode: &str) -> Result<FileId, FioError> {
        let mode = parse_mode(mode)?;
        let id = self.insert(
            PathBuf::from(STDIO_NAME),
            FileType::RunInputText,
            mode,
            Stream::stdio(mode),
        );
        info!(%id, "Opened standard stream (mode {}).", mode);
        Ok(id)
    }

    /// Flushes and releases the stream of `id` and frees its slot.
    ///
    /// Sessions still holding the handle fail every later transfer with
    /// [`FioError::HandleClosed`].
    #[instrument(skip(self), fields(id = %id))]
    pub fn close(&self, id: FileId) -> Result<(), FioError> {
        let handle = self
            .table
            .lock()
            .remove(id)
            .ok_or(FioError::InvalidHandle { id })?;

        let mut handle = handle.lock();
        let path = handle.display_path();
        if let Some(mut stream) = handle.stream.take() {
            stream
                .flush()
                .map_err(|source| FioError::Flush { path: path.clone(), source })?;
        }
        info!(%id, "Closed '{}'.", path);
        Ok(())
    }

    /// Binds a transfer session to `id` and the codec of its file type.
    pub fn select(&self, id: FileId) -> Result<FileSession, FioError> {
        let handle = self.handle(id)?;
        {
            let guard = handle.lock();
            if guard.stream.is_none() {
                return Err(FioError::HandleClosed { id });
            }
            if guard.codec.is_none() {
                return Err(FioError::UnsupportedFileType {
                    path: guard.display_path(),
                    file_type: guard.file_type,
                });
            }
            debug!(%id, "Selected '{}' for {} transfers.", guard.path.display(), guard.file_type);
        }
        Ok(FileSession::new(id, handle, Arc::clone(&self.comment)))
    }

    /// Opens `path` and hands out raw byte access to its stream.
    pub fn fopen(&self, path: impl AsRef<Path>, mode: &str) -> Result<FileStream, FioError> {
        let id = self.open(path, mode)?;
        let handle = self.handle(id)?;
        Ok(FileStream { id, handle })
    }

    /// Finds the handle that owns `stream`.
    pub fn find_by_stream(&self, stream: &FileStream) -> Option<FileId> {
        self.table
            .lock()
            .iter()
            .find(|(_, handle)| stream.same_stream(handle))
            .map(|(id, _)| id)
    }

    pub fn fclose(&self, stream: &FileStream) -> Result<(), FioError> {
        let id = self
            .find_by_stream(stream)
            .ok_or(FioError::InvalidHandle { id: stream.id })?;
        self.close(id)
    }

    pub fn open_count(&self) -> usize {
        self.table.lock().len()
    }

    pub fn set_precision(&self, id: FileId, precision: Precision) -> Result<(), FioError> {
        self.handle(id)?.lock().precision = precision;
        Ok(())
    }

    pub fn precision(&self, id: FileId) -> Result<Precision, FioError> {
        Ok(self.handle(id)?.lock().precision)
    }

    pub fn set_debug(&self, id: FileId, debug: bool) -> Result<(), FioError> {
        self.handle(id)?.lock().debug = debug;
        Ok(())
    }

    pub fn debug(&self, id: FileId) -> Result<bool, FioError> {
        Ok(self.handle(id)?.lock().debug)
    }

    pub fn path(&self, id: FileId) -> Result<PathBuf, FioError> {
        Ok(self.handle(id)?.lock().path.clone())
    }

    pub fn file_type(&self, id: FileId) -> Result<FileType, FioError> {
        Ok(self.handle(id)?.lock().file_type)
    }

    /// Overrides the file type, and with it the codec, of an open handle.
    pub fn set_file_type(&self, id: FileId, file_type: FileType) -> Result<(), FioError> {
        self.handle(id)?.lock().set_file_type(file_type);
        Ok(())
    }

    pub fn is_read(&self, id: FileId) -> Result<bool, FioError> {
        Ok(self.handle(id)?.lock().mode.is_read())
    }

    /// Comment placed before the description in annotated text output.
    pub fn set_comment(&self, comment: impl Into<String>) {
        *self.comment.write() = Some(comment.into());
    }

    pub fn unset_comment(&self) {
        *self.comment.write() = None;
    }

    pub fn flush(&self, id: FileId) -> Result<(), FioError> {
        let handle = self.handle(id)?;
        let mut handle = handle.lock();
        let path = handle.display_path();
        handle
            .stream_mut(id)?
            .flush()
            .map_err(|source| FioError::Flush { path, source })
    }

    /// Moves the cursor back to the start of the file. Nothing is truncated.
    pub fn rewind(&self, id: FileId) -> Result<(), FioError> {
        self.seek(id, 0)
    }

    /// Current byte offset of `id`, after flushing buffered output.
    pub fn tell(&self, id: FileId) -> Result<u64, FioError> {
        let handle = self.handle(id)?;
        let mut handle = handle.lock();
        if handle.is_stdio() {
            return Err(FioError::Stdio { operation: "tell" });
        }
        let path = handle.display_path();
        handle
            .stream_mut(id)?
            .position()
            .map_err(|source| FioError::Seek { path, source })
    }

    pub fn seek(&self, id: FileId, offset: u64) -> Result<(), FioError> {
        let handle = self.handle(id)?;
        let mut handle = handle.lock();
        if handle.is_stdio() {
            return Err(FioError::Stdio { operation: "seek" });
        }
        let path = handle.display_path();
        handle
            .stream_mut(id)?
            .seek_to(offset)
            .map_err(|source| FioError::Seek { path, source })
    }

    pub(super) fn handle(&self, id: FileId) -> Result<SharedHandle, FioError> {
        self.table
            .lock()
            .get(id)
            .cloned()
            .ok_or(FioError::InvalidHandle { id })
    }

    fn insert(&self, path: PathBuf, file_type: FileType, mode: OpenMode, stream: Stream) -> FileId {
        let handle = FileHandle::new(
            path,
            file_type,
            mode,
            stream,
            self.config.precision,
            self.config.debug,
        );
        self.table.lock().insert(Arc::new(Mutex::new(handle)))
    }
}

fn parse_mode(mode: &str) -> Result<OpenMode, FioError> {
    OpenMode::parse(mode).ok_or_else(|| FioError::InvalidMode {
        mode: mode.to_string(),
    })
}
