//! Primitive codecs that move one item at a time between memory and a stream.
//!
//! Three wire encodings share the [`ItemCodec`] contract:
//!
//! - [`text`] - human-readable columns with `;` comments, parsed token by token
//! - [`native`] - raw host-order bytes, compact but tied to the producing machine
//! - [`canonical`] - big-endian XDR units, portable across machines and precisions
//!
//! A handle stores one [`Codec`] chosen from its file type when it is opened.

pub mod canonical;
pub mod native;
pub mod strings;
pub mod text;

use super::filetype::FormatCategory;
use super::item::{Item, ItemKind, ItemMut};
use super::stream::ItemSource;
use super::types::Precision;
use std::io::{self, Write};
use thiserror::Error;

pub use canonical::CanonicalCodec;
pub use native::NativeCodec;
pub use text::TextCodec;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("cannot parse token '{token}' as {kind}")]
    Parse { kind: ItemKind, token: String },
    #[error("invalid string length {length}")]
    InvalidStringLength { length: i64 },
    #[error("string of {length} bytes does not fit its length prefix")]
    StringTooLong { length: usize },
    #[error("string is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl CodecError {
    pub(crate) fn short_read() -> Self {
        CodecError::Io(io::ErrorKind::UnexpectedEof.into())
    }
}

/// Per-transfer settings taken from the owning handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferOptions<'a> {
    pub precision: Precision,
    /// Trailing comment for annotated text output; ignored by binary codecs.
    pub annotation: Option<&'a str>,
}

pub trait ItemCodec {
    fn write_item<W: Write + ?Sized>(
        &self,
        out: &mut W,
        item: &Item<'_>,
        options: &TransferOptions<'_>,
    ) -> Result<(), CodecError>;

    fn read_item<R: ItemSource + ?Sized>(
        &self,
        input: &mut R,
        target: ItemMut<'_>,
        options: &TransferOptions<'_>,
    ) -> Result<(), CodecError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Text(TextCodec),
    Native(NativeCodec),
    Canonical(CanonicalCodec),
}

impl Codec {
    pub fn for_category(category: FormatCategory) -> Self {
        match category {
            FormatCategory::Text => Codec::Text(TextCodec),
            FormatCategory::NativeBinary => Codec::Native(NativeCodec),
            FormatCategory::CanonicalBinary => Codec::Canonical(CanonicalCodec),
        }
    }

    pub fn category(&self) -> FormatCategory {
        match self {
            Codec::Text(_) => FormatCategory::Text,
            Codec::Native(_) => FormatCategory::NativeBinary,
            Codec::Canonical(_) => FormatCategory::CanonicalBinary,
        }
    }
}

impl ItemCodec for Codec {
    fn write_item<W: Write + ?Sized>(
        &self,
        out: &mut W,
        item: &Item<'_>,
        options: &TransferOptions<'_>,
    ) -> Result<(), CodecError> {
        match self {
            Codec::Text(codec) => codec.write_item(out, item, options),
            Codec::Native(codec) => codec.write_item(out, item, options),
            Codec::Canonical(codec) => codec.write_item(out, item, options),
        }
    }

    fn read_item<R: ItemSource + ?Sized>(
        &self,
        input: &mut R,
        target: ItemMut<'_>,
        options: &TransferOptions<'_>,
    ) -> Result<(), CodecError> {
        match self {
            Codec::Text(codec) => codec.read_item(input, target, options),
            Codec::Native(codec) => codec.read_item(input, target, options),
            Codec::Canonical(codec) => codec.read_item(input, target, options),
        }
    }
}
