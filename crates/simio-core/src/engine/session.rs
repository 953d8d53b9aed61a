use super::error::{Direction, FioError};
use super::handle::{FileId, SharedHandle};
use crate::core::codec::{ItemCodec, TransferOptions};
use crate::core::item::{Item, ItemKind, ItemMut};
use crate::core::types::{IVec, RVec, Real, Step};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{trace, warn};

/// Item transfers bound to one selected handle.
///
/// Sessions are cheap to clone and may be moved to other threads. Each item
/// transfer holds the handle lock for its whole duration, so items from
/// concurrent writers never interleave within one record. Once the handle is
/// closed every transfer fails with [`FioError::HandleClosed`].
#[derive(Debug, Clone)]
pub struct FileSession {
    id: FileId,
    handle: SharedHandle,
    comment: Arc<RwLock<Option<String>>>,
}

impl FileSession {
    pub(crate) fn new(id: FileId, handle: SharedHandle, comment: Arc<RwLock<Option<String>>>) -> Self {
        Self { id, handle, comment }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn write(&self, item: Item<'_>, desc: &str) -> Result<(), FioError> {
        let kind = item.kind();
        kind.check_multiplicity(item.count())?;

        let mut guard = self.handle.lock();
        let handle = &mut *guard;
        let codec = handle.codec.ok_or_else(|| FioError::UnsupportedFileType {
            path: handle.display_path(),
            file_type: handle.file_type,
        })?;
        let annotation = handle.debug.then(|| self.annotation(desc));
        let options = TransferOptions {
            precision: handle.precision,
            annotation: annotation.as_deref(),
        };
        let debug = handle.debug;
        let stream = handle.stream_mut(self.id)?;

        trace!(id = %self.id, %kind, desc, "write");
        codec
            .write_item(stream, &item, &options)
            .map_err(|e| report(FioError::from_codec(e, Direction::Write, kind, desc, handle.display_path()), debug))
    }

    pub fn read(&self, target: ItemMut<'_>, desc: &str) -> Result<(), FioError> {
        let kind = target.kind();
        kind.check_multiplicity(target.count())?;

        let mut guard = self.handle.lock();
        let handle = &mut *guard;
        let codec = handle.codec.ok_or_else(|| FioError::UnsupportedFileType {
            path: handle.display_path(),
            file_type: handle.file_type,
        })?;
        let options = TransferOptions {
            precision: handle.precision,
            annotation: None,
        };
        let debug = handle.debug;
        let stream = handle.stream_mut(self.id)?;

        trace!(id = %self.id, %kind, desc, "read");
        codec
            .read_item(stream, target, &options)
            .map_err(|e| report(FioError::from_codec(e, Direction::Read, kind, desc, handle.display_path()), debug))
    }

    /// Reads and discards `count` items of `kind`.
    pub fn skip(&self, kind: ItemKind, count: usize, desc: &str) -> Result<(), FioError> {
        self.read(ItemMut::Skip { kind, count }, desc)
    }

    pub fn write_real(&self, value: Real, desc: &str) -> Result<(), FioError> {
        self.write(Item::Real(value), desc)
    }

    pub fn write_double(&self, value: f64, desc: &str) -> Result<(), FioError> {
        self.write(Item::Double(value), desc)
    }

    pub fn write_int(&self, value: i32, desc: &str) -> Result<(), FioError> {
        self.write(Item::Int(value), desc)
    }

    pub fn write_step(&self, value: Step, desc: &str) -> Result<(), FioError> {
        self.write(Item::Step(value), desc)
    }

    pub fn write_uchar(&self, value: u8, desc: &str) -> Result<(), FioError> {
        self.write(Item::UChar(value), desc)
    }

    pub fn write_uchars(&self, values: &[u8], desc: &str) -> Result<(), FioError> {
        self.write(Item::UChars(values), desc)
    }

    pub fn write_ushort(&self, value: u16, desc: &str) -> Result<(), FioError> {
        self.write(Item::UShort(value), desc)
    }

    pub fn write_rvec(&self, value: RVec, desc: &str) -> Result<(), FioError> {
        self.write(Item::RVec(value), desc)
    }

    pub fn write_rvecs(&self, values: &[RVec], desc: &str) -> Result<(), FioError> {
        self.write(Item::RVecs(values), desc)
    }

    pub fn write_ivec(&self, value: IVec, desc: &str) -> Result<(), FioError> {
        self.write(Item::IVec(value), desc)
    }

    pub fn write_string(&self, value: &str, desc: &str) -> Result<(), FioError> {
        self.write(Item::Str(value), desc)
    }

    pub fn read_real(&self, desc: &str) -> Result<Real, FioError> {
        let mut value = 0.0;
        self.read(ItemMut::Real(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_double(&self, desc: &str) -> Result<f64, FioError> {
        let mut value = 0.0;
        self.read(ItemMut::Double(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_int(&self, desc: &str) -> Result<i32, FioError> {
        let mut value = 0;
        self.read(ItemMut::Int(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_step(&self, desc: &str) -> Result<Step, FioError> {
        let mut value = 0;
        self.read(ItemMut::Step(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_uchar(&self, desc: &str) -> Result<u8, FioError> {
        let mut value = 0;
        self.read(ItemMut::UChar(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_uchars(&self, values: &mut [u8], desc: &str) -> Result<(), FioError> {
        self.read(ItemMut::UChars(values), desc)
    }

    pub fn read_ushort(&self, desc: &str) -> Result<u16, FioError> {
        let mut value = 0;
        self.read(ItemMut::UShort(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_rvec(&self, desc: &str) -> Result<RVec, FioError> {
        let mut value = RVec::zeros();
        self.read(ItemMut::RVec(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_rvecs(&self, values: &mut [RVec], desc: &str) -> Result<(), FioError> {
        self.read(ItemMut::RVecs(values), desc)
    }

    pub fn read_ivec(&self, desc: &str) -> Result<IVec, FioError> {
        let mut value = IVec::zeros();
        self.read(ItemMut::IVec(&mut value), desc)?;
        Ok(value)
    }

    pub fn read_string(&self, desc: &str) -> Result<String, FioError> {
        let mut value = String::new();
        self.read(ItemMut::Str(&mut value), desc)?;
        Ok(value)
    }

    fn annotation(&self, desc: &str) -> String {
        match self.comment.read().as_deref() {
            Some(comment) => format!("{} {}", comment, desc),
            None => desc.to_string(),
        }
    }
}

fn report(err: FioError, debug: bool) -> FioError {
    if debug && !err.is_fatal() {
        warn!("{}", err);
    }
    err
}
