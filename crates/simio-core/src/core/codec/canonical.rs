use super::native::read_bounded;
use super::{CodecError, ItemCodec, TransferOptions};
use crate::core::item::{Item, ItemKind, ItemMut};
use crate::core::stream::ItemSource;
use crate::core::types::{Precision, RVec, Real, Step};
use bytes::{Buf, BufMut, BytesMut};
use std::io::{self, Read, Write};

/// XDR unit size; every encoded value occupies a multiple of this.
pub const UNIT: usize = 4;

/// Portable big-endian encoding compatible with XDR (RFC 4506).
///
/// Bytes and shorts are widened to a full 4-byte unit, the step counter is
/// written as a high and a low 32-bit word, and strings carry an outer length
/// (bytes + 1) ahead of a regular XDR string. The real width comes from the
/// handle's precision flag, so a double-precision reader can consume a
/// single-precision file once told which it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalCodec;

impl CanonicalCodec {
    /// Encoded size of one value of `kind`, or `None` for variable-length strings.
    pub fn item_size(kind: ItemKind, precision: Precision) -> Option<usize> {
        let real = precision.real_size();
        match kind {
            ItemKind::Real => Some(real),
            ItemKind::Double | ItemKind::Step => Some(8),
            ItemKind::Int | ItemKind::UChar | ItemKind::UChars | ItemKind::UShort => Some(UNIT),
            ItemKind::RVec | ItemKind::RVecs => Some(3 * real),
            ItemKind::IVec => Some(3 * UNIT),
            ItemKind::String => None,
        }
    }
}

impl ItemCodec for CanonicalCodec {
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
            Item::Double(value) => buf.put_f64(value),
            Item::Int(value) => buf.put_i32(value),
            Item::Step(value) => put_step(&mut buf, value),
            Item::UChar(value) => buf.put_u32(value.into()),
            Item::UChars(values) => values.iter().for_each(|&v| buf.put_u32(v.into())),
            Item::UShort(value) => buf.put_u32(value.into()),
            Item::RVec(v) => put_rvec(&mut buf, &v, precision),
            Item::RVecs(values) => values.iter().for_each(|v| put_rvec(&mut buf, v, precision)),
            Item::IVec(v) => v.iter().for_each(|&c| buf.put_i32(c)),
            Item::Str(value) => put_string(&mut buf, value)?,
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
            ItemMut::Double(dst) => *dst = read_f64(input)?,
            ItemMut::Int(dst) => *dst = read_i32(input)?,
            ItemMut::Step(dst) => *dst = read_step(input)?,
            ItemMut::UChar(dst) => *dst = read_u32(input)? as u8,
            ItemMut::UChars(dst) => {
                for value in dst.iter_mut() {
                    *value = read_u32(input)? as u8;
                }
            }
            ItemMut::UShort(dst) => *dst = read_u32(input)? as u16,
            ItemMut::RVec(dst) => *dst = read_rvec(input, precision)?,
            ItemMut::RVecs(dst) => {
                for v in dst.iter_mut() {
                    *v = read_rvec(input, precision)?;
                }
            }
            ItemMut::IVec(dst) => {
                for component in dst.iter_mut() {
                    *component = read_i32(input)?;
                }
            }
            ItemMut::Str(dst) => *dst = read_string(input)?,
            ItemMut::Skip { kind, count } => match Self::item_size(kind, precision) {
                Some(size) => discard(input, (size * count) as u64)?,
                None => {
                    for _ in 0..count {
                        let length = read_string_header(input)?;
                        discard(input, (length + padding(length)) as u64)?;
                    }
                }
            },
        }
        Ok(())
    }
}

fn put_real(buf: &mut BytesMut, value: Real, precision: Precision) {
    match precision {
        Precision::Single => buf.put_f32(value as f32),
        Precision::Double => buf.put_f64(value),
    }
}

fn put_rvec(buf: &mut BytesMut, v: &RVec, precision: Precision) {
    for &component in v.iter() {
        put_real(buf, component, precision);
    }
}

fn put_step(buf: &mut BytesMut, value: Step) {
    buf.put_i32((value >> 32) as i32);
    buf.put_u32(value as u32);
}

fn put_string(buf: &mut BytesMut, value: &str) -> Result<(), CodecError> {
    let bytes = value.as_bytes();
    let declared = i32::try_from(bytes.len() + 1)
        .map_err(|_| CodecError::StringTooLong { length: bytes.len() })?;
    buf.put_i32(declared);
    buf.put_u32(bytes.len() as u32);
    buf.put_slice(bytes);
    buf.put_bytes(0, padding(bytes.len()));
    Ok(())
}

fn padding(length: usize) -> usize {
    (UNIT - length % UNIT) % UNIT
}

fn read_array<const N: usize, R: Read + ?Sized>(input: &mut R) -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_i32<R: Read + ?Sized>(input: &mut R) -> Result<i32, CodecError> {
    Ok((&read_array::<4, _>(input)?[..]).get_i32())
}

fn read_u32<R: Read + ?Sized>(input: &mut R) -> Result<u32, CodecError> {
    Ok((&read_array::<4, _>(input)?[..]).get_u32())
}

fn read_f64<R: Read + ?Sized>(input: &mut R) -> Result<f64, CodecError> {
    Ok((&read_array::<8, _>(input)?[..]).get_f64())
}

fn read_real<R: Read + ?Sized>(input: &mut R, precision: Precision) -> Result<Real, CodecError> {
    Ok(match precision {
        Precision::Single => (&read_array::<4, _>(input)?[..]).get_f32() as Real,
        Precision::Double => read_f64(input)?,
    })
}

fn read_rvec<R: Read + ?Sized>(input: &mut R, precision: Precision) -> Result<RVec, CodecError> {
    let x = read_real(input, precision)?;
    let y = read_real(input, precision)?;
    let z = read_real(input, precision)?;
    Ok(RVec::new(x, y, z))
}

fn read_step<R: Read + ?Sized>(input: &mut R) -> Result<Step, CodecError> {
    let high = read_i32(input)?;
    let low = read_u32(input)?;
    Ok(((high as Step) << 32) | low as Step)
}

/// Reads both length words of a string and returns the byte count that follows.
fn read_string_header<R: Read + ?Sized>(input: &mut R) -> Result<usize, CodecError> {
    let declared = read_i32(input)?;
    if declared <= 0 {
        return Err(CodecError::InvalidStringLength {
            length: declared.into(),
        });
    }
    let length = read_u32(input)? as usize;
    if length > declared as usize {
        return Err(CodecError::StringTooLong { length });
    }
    Ok(length)
}

fn read_string<R: Read + ?Sized>(input: &mut R) -> Result<String, CodecError> {
    let length = read_string_header(input)?;
    let mut bytes = read_bounded(input, length + padding(length))?;
    bytes.truncate(length);
    Ok(String::from_utf8(bytes)?)
}

fn discard<R: Read + ?Sized>(input: &mut R, count: u64) -> Result<(), CodecError> {
    let copied = io::copy(&mut Read::take(&mut *input, count), &mut io::sink())?;
    if copied < count {
        return Err(CodecError::short_read());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec;
    use std::io::Cursor;

    fn encode(item: Item<'_>, precision: Precision) -> Vec<u8> {
        let mut out = Vec::new();
        let options = TransferOptions {
            precision,
            annotation: None,
        };
        CanonicalCodec.write_item(&mut out, &item, &options).unwrap();
        out
    }

    fn decode_real(bytes: Vec<u8>, precision: Precision) -> Real {
        let options = TransferOptions {
            precision,
            annotation: None,
        };
        let mut value = 0.0;
        CanonicalCodec
            .read_item(&mut Cursor::new(bytes), ItemMut::Real(&mut value), &options)
            .unwrap();
        value
    }

    #[test]
    fn int_is_big_endian() {
        assert_eq!(encode(Item::Int(42), Precision::Single), vec![0, 0, 0, 42]);
        assert_eq!(encode(Item::Int(-1), Precision::Single), vec![0xff; 4]);
    }

    #[test]
    fn small_integers_are_widened_to_a_unit() {
        assert_eq!(encode(Item::UChar(7), Precision::Single), vec![0, 0, 0, 7]);
        assert_eq!(encode(Item::UShort(0x0102), Precision::Single), vec![0, 0, 1, 2]);
        assert_eq!(encode(Item::UChars(&[1, 2]), Precision::Single).len(), 2 * UNIT);
    }

    #[test]
    fn real_width_is_chosen_by_precision_not_host() {
        assert_eq!(encode(Item::Real(1.0), Precision::Single), 1.0f32.to_be_bytes().to_vec());
        assert_eq!(encode(Item::Real(1.0), Precision::Double), 1.0f64.to_be_bytes().to_vec());
        assert_eq!(encode(Item::Double(1.0), Precision::Single).len(), 8);
    }

    #[test]
    fn single_precision_loses_only_float_precision() {
        let value = std::f64::consts::PI;
        let single = decode_real(encode(Item::Real(value), Precision::Single), Precision::Single);
        assert_eq!(single, Precision::Single.quantize(value));
        let double = decode_real(encode(Item::Real(value), Precision::Double), Precision::Double);
        assert_eq!(double, value);
    }

    #[test]
    fn step_is_split_into_high_and_low_words() {
        let step: Step = (3 << 32) + 5;
        assert_eq!(
            encode(Item::Step(step), Precision::Single),
            vec![0, 0, 0, 3, 0, 0, 0, 5]
        );
    }

    #[test]
    fn steps_round_trip_across_the_32_bit_boundary() {
        let options = TransferOptions::default();
        for step in [0, 1, -1, i32::MAX as Step, i32::MAX as Step + 1, u32::MAX as Step + 7, -(1 << 40), Step::MAX, Step::MIN] {
            let mut input = Cursor::new(encode(Item::Step(step), Precision::Single));
            let mut value = 0;
            CanonicalCodec
                .read_item(&mut input, ItemMut::Step(&mut value), &options)
                .unwrap();
            assert_eq!(value, step);
        }
    }

    #[test]
    fn string_layout_has_two_lengths_and_padding() {
        let bytes = encode(Item::Str("hello"), Precision::Single);
        assert_eq!(&bytes[0..4], &6i32.to_be_bytes());
        assert_eq!(&bytes[4..8], &5u32.to_be_bytes());
        assert_eq!(&bytes[8..13], b"hello");
        assert_eq!(&bytes[13..], &[0, 0, 0]);
        assert_eq!(bytes.len() % UNIT, 0);
    }

    #[test]
    fn non_positive_declared_length_is_a_protocol_error() {
        for declared in [0i32, -3] {
            let mut input = Cursor::new(declared.to_be_bytes().to_vec());
            let mut value = String::new();
            let err = CanonicalCodec
                .read_item(&mut input, ItemMut::Str(&mut value), &TransferOptions::default())
                .unwrap_err();
            assert!(matches!(err, CodecError::InvalidStringLength { length } if length == declared as i64));
        }
    }

    #[test]
    fn rvec_array_is_a_flat_run_of_vectors() {
        let vectors = [RVec::new(1.0, 2.0, 3.0), RVec::new(4.0, 5.0, 6.0)];
        let flat = encode(Item::RVecs(&vectors), Precision::Single);
        let mut separate = encode(Item::RVec(vectors[0]), Precision::Single);
        separate.extend(encode(Item::RVec(vectors[1]), Precision::Single));
        assert_eq!(flat, separate);
    }

    #[test]
    fn skip_consumes_strings_exactly() {
        let mut bytes = encode(Item::Str("skip me please"), Precision::Single);
        bytes.extend(encode(Item::IVec(IVec::new(4, 5, 6)), Precision::Single));
        let options = TransferOptions::default();
        let mut input = Cursor::new(bytes);
        CanonicalCodec
            .read_item(&mut input, ItemMut::Skip { kind: ItemKind::String, count: 1 }, &options)
            .unwrap();
        let mut ivec = IVec::zeros();
        CanonicalCodec
            .read_item(&mut input, ItemMut::IVec(&mut ivec), &options)
            .unwrap();
        assert_eq!(ivec, IVec::new(4, 5, 6));
    }

    #[test]
    fn skipping_past_the_end_is_a_short_read() {
        let mut input = Cursor::new(vec![0u8; 6]);
        let err = CanonicalCodec
            .read_item(&mut input, ItemMut::Skip { kind: ItemKind::Double, count: 1 }, &TransferOptions::default())
            .unwrap_err();
        assert!(matches!(err, CodecError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn corrupt_string_length_fails_without_reserving_it() {
        let mut bytes = i32::MAX.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(i32::MAX as u32 - 1).to_be_bytes());
        bytes.extend_from_slice(b"short");
        let mut value = String::new();
        let err = CanonicalCodec
            .read_item(&mut Cursor::new(bytes), ItemMut::Str(&mut value), &TransferOptions::default())
            .unwrap_err();
        assert!(matches!(err, CodecError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }
}
