use super::error::FioError;
use crate::core::codec::Codec;
use crate::core::filetype::FileType;
use crate::core::stream::{OpenMode, Stream};
use crate::core::types::Precision;
use parking_lot::Mutex;
use slotmap::{Key, new_key_type};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Name recorded for handles bound to standard input or output.
pub const STDIO_NAME: &str = "STDIO";

new_key_type! {
    /// Identifier of an open handle.
    ///
    /// Slot numbers are reused after a close, but the generation half of the
    /// key is not, so a stale id is rejected instead of reaching a new file.
    pub struct FileId;
}

impl FileId {
    /// Table slot this id occupies.
    pub fn slot(self) -> u32 {
        (self.data().as_ffi() & 0xffff_ffff) as u32
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.slot())
    }
}

#[derive(Debug)]
pub(crate) struct FileHandle {
    pub path: PathBuf,
    pub file_type: FileType,
    pub mode: OpenMode,
    pub precision: Precision,
    pub debug: bool,
    pub offset_out_of_range: bool,
    pub codec: Option<Codec>,
    /// `None` once the handle is closed.
    pub stream: Option<Stream>,
}

pub(crate) type SharedHandle = Arc<Mutex<FileHandle>>;

impl FileHandle {
    pub fn new(
        path: PathBuf,
        file_type: FileType,
        mode: OpenMode,
        stream: Stream,
        precision: Precision,
        debug: bool,
    ) -> Self {
        Self {
            path,
            file_type,
            mode,
            precision,
            debug,
            offset_out_of_range: false,
            codec: file_type.category().map(Codec::for_category),
            stream: Some(stream),
        }
    }

    pub fn set_file_type(&mut self, file_type: FileType) {
        self.file_type = file_type;
        self.codec = file_type.category().map(Codec::for_category);
    }

    pub fn is_stdio(&self) -> bool {
        self.stream.as_ref().is_some_and(Stream::is_stdio)
    }

    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn stream_mut(&mut self, id: FileId) -> Result<&mut Stream, FioError> {
        self.stream.as_mut().ok_or(FioError::HandleClosed { id })
    }
}

/// Raw byte access to a registered stream, for free-form output such as logs.
///
/// The stream stays owned by the registry; close it with
/// [`FileRegistry::fclose`](super::registry::FileRegistry::fclose).
#[derive(Debug, Clone)]
pub struct FileStream {
    pub(crate) id: FileId,
    pub(crate) handle: SharedHandle,
}

impl FileStream {
    pub fn path(&self) -> PathBuf {
        self.handle.lock().path.clone()
    }

    pub(crate) fn same_stream(&self, handle: &SharedHandle) -> bool {
        Arc::ptr_eq(&self.handle, handle)
    }

    fn with_stream<T>(&self, op: impl FnOnce(&mut Stream) -> io::Result<T>) -> io::Result<T> {
        let mut handle = self.handle.lock();
        match handle.stream.as_mut() {
            Some(stream) => op(stream),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("stream for {} has been closed", handle.path.display()),
            )),
        }
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.with_stream(|stream| stream.read(buf))
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_stream(|stream| stream.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_stream(|stream| stream.flush())
    }
}
