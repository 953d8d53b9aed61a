use super::{CodecError, ItemCodec, TransferOptions};
use crate::core::item::{Item, ItemKind, ItemMut};
use crate::core::stream::ItemSource;
use crate::core::types::{Precision, Real};
use bytes::{Buf, BufMut, BytesMut};
use std::io::{Read, Write};

/// Raw host-order bytes, laid out as the values sit in memory.
///
/// Files written this way are only portable between machines that share byte
/// order; the real width is fixed per handle, never sniffed from the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeCodec;

impl NativeCodec {
    /// Encoded size of one value of `kind`, or `None` for variable-length strings.
    pub fn item_size(kind: ItemKind, precision: Precision) -> Option<usize> {
        let real = precision.real_size();
        match kind {
            ItemKind::Real => Some(real),
            ItemKind::Double => Some(8),
            ItemKind::Int => Some(4),
            ItemKind::Step => Some(8),
            ItemKind::UChar | ItemKind::UChars => Some(1),
            ItemKind::UShort => Some(2),
            ItemKind::RVec | ItemKind::RVecs => Some(3 * real),
            ItemKind::IVec => Some(12),
            ItemKind::String => None,
        }
    }
}

impl ItemCodec for NativeCodec {
    fn write_item<W: Write + ?Sized>(
        &self,
        out: &mut W,
        item: &Item<'_>,
        options: &TransferOptions<'_>,
    ) -> Result<(), CodecError> {
        let precision = options.precision;
        let mut buf = BytesMut::with_capacity(16);
        match *item {
            Item::Real(value) => put_real(&mut buf, value, precision),
            Item::Double(value) => buf.put_f64_ne(value),
            Item::Int(value) => buf.put_i32_ne(value),
            Item::Step(value) => buf.put_i64_ne(value),
            Item::UChar(value) => buf.put_u8(value),
            Item::UChars(values) => buf.put_slice(values),
            Item::UShort(value) => buf.put_u16_ne(value),
            Item::RVec(v) => v.iter().for_each(|&c| put_real(&mut buf, c, precision)),
            Item::RVecs(values) => {
                for v in values {
                    v.iter().for_each(|&c| put_real(&mut buf, c, precision));
                }
            }
            Item::IVec(v) => v.iter().for_each(|&c| buf.put_i32_ne(c)),
            Item::Str(value) => {
                let length = i32::try_from(value.len() + 1)
                    .map_err(|_| CodecError::StringTooLong { length: value.len() })?;
                buf.put_i32_ne(length);
                buf.put_slice(value.as_bytes());
                buf.put_u8(0);
            }
        }
        out.write_all(&buf)?;
        Ok(())
    }

    fn read_item<R: ItemSource + ?Sized>(
        &self,
        input: &mut R,
        target: ItemMut<'_>,
        options: &TransferOptions<'_>,
    ) -> Result<(), CodecError> {
        let precision = options.precision;
        match target {
            ItemMut::Real(dst) => *dst = read_real(input, precision)?,
            ItemMut::Double(dst) => *dst = (&read_array::<8, _>(input)?[..]).get_f64_ne(),
            ItemMut::Int(dst) => *dst = read_i32(input)?,
            ItemMut::Step(dst) => *dst = (&read_array::<8, _>(input)?[..]).get_i64_ne(),
            ItemMut::UChar(dst) => *dst = read_array::<1, _>(input)?[0],
            ItemMut::UChars(dst) => input.read_exact(dst)?,
            ItemMut::UShort(dst) => *dst = (&read_array::<2, _>(input)?[..]).get_u16_ne(),
            ItemMut::RVec(dst) => {
                for component in dst.iter_mut() {
                    *component = read_real(input, precision)?;
                }
            }
            ItemMut::RVecs(dst) => {
                for v in dst.iter_mut() {
                    for component in v.iter_mut() {
                        *component = read_real(input, precision)?;
                    }
                }
            }
            ItemMut::IVec(dst) => {
                for component in dst.iter_mut() {
                    *component = read_i32(input)?;
                }
            }
            ItemMut::Str(dst) => {
                let length = read_string_length(input)?;
                let mut bytes = read_bounded(input, length)?;
                if bytes.last() == Some(&0) {
                    bytes.pop();
                }
                *dst = String::from_utf8(bytes)?;
            }
            ItemMut::Skip { kind, count } => match Self::item_size(kind, precision) {
                Some(size) => input.skip_bytes((size * count) as u64)?,
                None => {
                    for _ in 0..count {
                        let length = read_string_length(input)?;
                        input.skip_bytes(length as u64)?;
                    }
                }
            },
        }
        Ok(())
    }
}

fn put_real(buf: &mut BytesMut, value: Real, precision: Precision) {
    match precision {
        Precision::Single => buf.put_f32_ne(value as f32),
        Precision::Double => buf.put_f64_ne(value),
    }
}

fn read_real<R: Read + ?Sized>(input: &mut R, precision: Precision) -> Result<Real, CodecError> {
    Ok(match precision {
        Precision::Single => (&read_array::<4, _>(input)?[..]).get_f32_ne() as Real,
        Precision::Double => (&read_array::<8, _>(input)?[..]).get_f64_ne(),
    })
}

fn read_i32<R: Read + ?Sized>(input: &mut R) -> Result<i32, CodecError> {
    Ok((&read_array::<4, _>(input)?[..]).get_i32_ne())
}

fn read_string_length<R: Read + ?Sized>(input: &mut R) -> Result<usize, CodecError> {
    let length = read_i32(input)?;
    usize::try_from(length).map_err(|_| CodecError::InvalidStringLength {
        length: length.into(),
    })
}

fn read_array<const N: usize, R: Read + ?Sized>(input: &mut R) -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads exactly `length` bytes, growing the buffer only as data arrives.
pub(crate) fn read_bounded<R: Read + ?Sized>(input: &mut R, length: usize) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    Read::take(&mut *input, length as u64).read_to_end(&mut bytes)?;
    if bytes.len() < length {
        return Err(CodecError::short_read());
    }
    Ok(bytes)
}
