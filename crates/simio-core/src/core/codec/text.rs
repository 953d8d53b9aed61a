use super::strings::{decode_text_string, encode_text_string};
use super::{CodecError, ItemCodec, TransferOptions};
use crate::core::item::{Item, ItemKind, ItemMut};
use crate::core::stream::ItemSource;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing::warn;

/// Width of a numeric or string column.
pub const FIELD_WIDTH: usize = 18;
/// Width of a byte column.
pub const BYTE_FIELD_WIDTH: usize = 4;
/// Mantissa digits for single-precision reals.
pub const REAL_DIGITS: usize = 10;
/// Mantissa digits for doubles; enough for an exact round trip.
pub const DOUBLE_DIGITS: usize = 16;

const MAX_TOKEN_LEN: usize = 4096;
const COMMENT_CHAR: u8 = b';';

/// Column-formatted text, one item per line, `;` starting a comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCodec;

impl ItemCodec for TextCodec {
    fn write_item<W: Write + ?Sized>(
        &self,
        out: &mut W,
        item: &Item<'_>,
        options: &TransferOptions<'_>,
    ) -> Result<(), CodecError> {
        let trailer = options
            .annotation
            .map(|text| format!("  ; {}", text))
            .unwrap_or_default();
        let real_digits = if options.precision.is_double() {
            DOUBLE_DIGITS
        } else {
            REAL_DIGITS
        };
        let real = |value: f64| column(&format_scientific(value, real_digits));

        let line = match *item {
            Item::Real(value) => real(value),
            Item::Double(value) => column(&format_scientific(value, DOUBLE_DIGITS)),
            Item::Int(value) => column(&value.to_string()),
            Item::Step(value) => column(&value.to_string()),
            Item::UChar(value) => byte_column(value),
            Item::UChars(values) => values.iter().map(|&v| byte_column(v)).collect(),
            Item::UShort(value) => column(&value.to_string()),
            Item::RVec(v) => v.iter().map(|&c| real(c)).collect(),
            Item::RVecs(values) => {
                for v in values {
                    let line: String = v.iter().map(|&c| real(c)).collect();
                    writeln!(out, "{}{}", line, trailer)?;
                }
                return Ok(());
            }
            Item::IVec(v) => v.iter().map(|c| column(&c.to_string())).collect(),
            Item::Str(value) => format!("{:<w$}", encode_text_string(value), w = FIELD_WIDTH),
        };
        writeln!(out, "{}{}", line, trailer)?;
        Ok(())
    }

    fn read_item<R: ItemSource + ?Sized>(
        &self,
        input: &mut R,
        target: ItemMut<'_>,
        _options: &TransferOptions<'_>,
    ) -> Result<(), CodecError> {
        match target {
            ItemMut::Real(dst) | ItemMut::Double(dst) => *dst = parse_next(input, ItemKind::Real)?,
            ItemMut::Int(dst) => *dst = parse_next(input, ItemKind::Int)?,
            ItemMut::Step(dst) => *dst = parse_next(input, ItemKind::Step)?,
            ItemMut::UChar(dst) => *dst = parse_next(input, ItemKind::UChar)?,
            ItemMut::UChars(dst) => {
                for value in dst.iter_mut() {
                    *value = parse_next(input, ItemKind::UChars)?;
                }
            }
            ItemMut::UShort(dst) => *dst = parse_next(input, ItemKind::UShort)?,
            ItemMut::RVec(dst) => {
                for component in dst.iter_mut() {
                    *component = parse_next(input, ItemKind::RVec)?;
                }
            }
            ItemMut::RVecs(dst) => {
                for v in dst.iter_mut() {
                    for component in v.iter_mut() {
                        *component = parse_next(input, ItemKind::RVecs)?;
                    }
                }
            }
            ItemMut::IVec(dst) => {
                for component in dst.iter_mut() {
                    *component = parse_next(input, ItemKind::IVec)?;
                }
            }
            ItemMut::Str(dst) => *dst = decode_text_string(&next_token(input)?),
            ItemMut::Skip { kind, count } => {
                for _ in 0..tokens_for(kind, count) {
                    next_token(input)?;
                }
            }
        }
        Ok(())
    }
}

/// Right-justifies `field` in a column, always leaving at least one blank in
/// front so adjacent columns never run together.
fn column(field: &str) -> String {
    format!(" {:>w$}", field, w = FIELD_WIDTH - 1)
}

fn byte_column(value: u8) -> String {
    format!(" {:>w$}", value, w = BYTE_FIELD_WIDTH - 1)
}

fn tokens_for(kind: ItemKind, count: usize) -> usize {
    match kind {
        ItemKind::RVec | ItemKind::RVecs | ItemKind::IVec => 3 * count,
        _ => count,
    }
}

fn parse_next<T: FromStr, R: BufRead + ?Sized>(input: &mut R, kind: ItemKind) -> Result<T, CodecError> {
    let token = next_token(input)?;
    token
        .parse()
        .map_err(|_| CodecError::Parse { kind, token })
}

/// Reads the next whitespace-delimited token, skipping `;` comments up to the
/// end of their line. The delimiter that ends a token is left in the stream.
pub fn next_token<R: BufRead + ?Sized>(input: &mut R) -> Result<String, CodecError> {
    let mut token = Vec::new();
    let mut in_comment = false;
    let mut dropped = 0usize;

    while let Some(byte) = peek_byte(input)? {
        if in_comment {
            input.consume(1);
            if byte == b'\n' {
                in_comment = false;
            }
            continue;
        }
        if byte.is_ascii_whitespace() || byte == COMMENT_CHAR {
            if !token.is_empty() {
                break;
            }
            input.consume(1);
            in_comment = byte == COMMENT_CHAR;
            continue;
        }
        input.consume(1);
        if token.len() < MAX_TOKEN_LEN {
            token.push(byte);
        } else {
            dropped += 1;
        }
    }

    if token.is_empty() {
        return Err(CodecError::short_read());
    }
    if dropped > 0 {
        warn!(
            "Token of {} bytes truncated to {} bytes.",
            token.len() + dropped,
            MAX_TOKEN_LEN
        );
    }
    Ok(String::from_utf8(token)?)
}

fn peek_byte<R: BufRead + ?Sized>(input: &mut R) -> io::Result<Option<u8>> {
    loop {
        match input.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Formats a real like C's `%.*e`: `digits` mantissa digits and a signed,
/// at-least-two-digit exponent.
pub fn format_scientific(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.digits$e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IVec, Precision, RVec};
    use std::io::Cursor;

    fn write(item: Item<'_>, annotation: Option<&str>) -> String {
        let mut out = Vec::new();
        let options = TransferOptions {
            annotation,
            ..Default::default()
        };
        TextCodec.write_item(&mut out, &item, &options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn format_scientific_matches_c_layout() {
        assert_eq!(format_scientific(1.0, REAL_DIGITS), "1.0000000000e+00");
        assert_eq!(format_scientific(-123.456, REAL_DIGITS), "-1.2345600000e+02");
        assert_eq!(format_scientific(0.00042, REAL_DIGITS), "4.2000000000e-04");
        assert_eq!(format_scientific(0.0, REAL_DIGITS), "0.0000000000e+00");
        assert_eq!(format_scientific(-1.5e-100, REAL_DIGITS), "-1.5000000000e-100");
        assert_eq!(format_scientific(f64::INFINITY, REAL_DIGITS), "inf");
    }

    #[test]
    fn numbers_are_right_justified_in_eighteen_columns() {
        assert_eq!(write(Item::Int(42), None), format!("{:>18}\n", 42));
        assert_eq!(write(Item::Real(1.0), None), "  1.0000000000e+00\n");
        assert_eq!(write(Item::UChar(7), None), "   7\n");
        let line = write(Item::IVec(IVec::new(1, 2, 3)), None);
        assert_eq!(line.trim_end().len(), 3 * FIELD_WIDTH);
    }

    #[test]
    fn rvec_occupies_three_columns_on_one_line() {
        let line = write(Item::RVec(RVec::new(1.0, 2.0, 3.0)), None);
        assert_eq!(line.lines().count(), 1);
        assert_eq!(line.trim_end_matches('\n').len(), 3 * FIELD_WIDTH);
    }

    #[test]
    fn strings_are_left_justified_and_escaped() {
        assert_eq!(write(Item::Str("a b"), None), "a_b               \n");
    }

    #[test]
    fn annotation_is_appended_as_comment() {
        let line = write(Item::Int(3), Some("header natoms"));
        assert!(line.ends_with("  ; header natoms\n"));
    }

    #[test]
    fn tokenizer_skips_comments_and_blank_lines() {
        let mut input = Cursor::new("; leading comment\n\n   12 ; trailing\n  abc;tail\n  7");
        assert_eq!(next_token(&mut input).unwrap(), "12");
        assert_eq!(next_token(&mut input).unwrap(), "abc");
        assert_eq!(next_token(&mut input).unwrap(), "7");
        assert!(matches!(next_token(&mut input), Err(CodecError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn annotated_output_reads_back() {
        let mut out = Vec::new();
        let options = TransferOptions {
            annotation: Some("box vectors"),
            ..Default::default()
        };
        let v = RVec::new(2.5, 2.5, 2.5);
        TextCodec.write_item(&mut out, &Item::RVec(v), &options).unwrap();
        TextCodec.write_item(&mut out, &Item::Int(9), &options).unwrap();

        let mut input = Cursor::new(out);
        let mut read_back = RVec::zeros();
        let mut count = 0;
        TextCodec.read_item(&mut input, ItemMut::RVec(&mut read_back), &options).unwrap();
        TextCodec.read_item(&mut input, ItemMut::Int(&mut count), &options).unwrap();
        assert_eq!(read_back, v);
        assert_eq!(count, 9);
    }

    #[test]
    fn unparsable_token_is_reported_with_its_kind() {
        let mut input = Cursor::new("twelve\n");
        let mut value = 0;
        let err = TextCodec
            .read_item(&mut input, ItemMut::Int(&mut value), &TransferOptions::default())
            .unwrap_err();
        match err {
            CodecError::Parse { kind, token } => {
                assert_eq!(kind, ItemKind::Int);
                assert_eq!(token, "twelve");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn uchar_out_of_range_fails_to_parse() {
        let mut input = Cursor::new(" 300\n");
        let mut value = 0u8;
        let result = TextCodec.read_item(&mut input, ItemMut::UChar(&mut value), &TransferOptions::default());
        assert!(matches!(result, Err(CodecError::Parse { .. })));
    }

    fn read_back_rvec(bytes: Vec<u8>, options: &TransferOptions<'_>) -> RVec {
        let mut value = RVec::zeros();
        TextCodec
            .read_item(&mut Cursor::new(bytes), ItemMut::RVec(&mut value), options)
            .unwrap();
        value
    }

    #[test]
    fn full_width_columns_stay_separated() {
        let v = RVec::new(1.0, -1.5e-100, 2.0);
        let line = write(Item::RVec(v), None);
        assert_eq!(line.split_whitespace().count(), 3);

        let options = TransferOptions::default();
        let mut out = Vec::new();
        TextCodec.write_item(&mut out, &Item::RVec(v), &options).unwrap();
        TextCodec.write_item(&mut out, &Item::Int(-7), &options).unwrap();
        let mut input = Cursor::new(out);
        let mut read_back = RVec::zeros();
        let mut next = 0;
        TextCodec.read_item(&mut input, ItemMut::RVec(&mut read_back), &options).unwrap();
        TextCodec.read_item(&mut input, ItemMut::Int(&mut next), &options).unwrap();
        assert_eq!(read_back, v);
        assert_eq!(next, -7);
    }

    #[test]
    fn doubles_keep_every_bit() {
        let pi = std::f64::consts::PI;
        let options = TransferOptions::default();
        let mut out = Vec::new();
        TextCodec.write_item(&mut out, &Item::Double(pi), &options).unwrap();
        let mut value = 0.0;
        TextCodec
            .read_item(&mut Cursor::new(out), ItemMut::Double(&mut value), &options)
            .unwrap();
        assert_eq!(value, pi);

        let double = TransferOptions {
            precision: Precision::Double,
            annotation: None,
        };
        let v = RVec::new(pi, -pi * 1e-120, 1.0 / 3.0);
        let mut out = Vec::new();
        TextCodec.write_item(&mut out, &Item::RVec(v), &double).unwrap();
        assert_eq!(read_back_rvec(out, &double), v);
    }

    #[test]
    fn single_precision_reals_keep_float_accuracy() {
        let pi = std::f64::consts::PI;
        let options = TransferOptions::default();
        let mut out = Vec::new();
        TextCodec.write_item(&mut out, &Item::Real(pi), &options).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  3.1415926536e+00\n");
    }

    #[test]
    fn empty_and_awkward_strings_keep_the_stream_in_step() {
        let options = TransferOptions::default();
        let originals = ["", "a;b", "two\nlines", "under_score and\ttab"];
        let mut out = Vec::new();
        for text in originals {
            TextCodec.write_item(&mut out, &Item::Str(text), &options).unwrap();
            TextCodec.write_item(&mut out, &Item::Int(5), &options).unwrap();
        }

        let mut input = Cursor::new(out);
        for text in originals {
            let mut value = String::from("stale");
            let mut next = 0;
            TextCodec.read_item(&mut input, ItemMut::Str(&mut value), &options).unwrap();
            TextCodec.read_item(&mut input, ItemMut::Int(&mut next), &options).unwrap();
            assert_eq!(value, text);
            assert_eq!(next, 5);
        }
    }

    #[test]
    fn overlong_tokens_are_cut_to_the_limit() {
        let long = "7".repeat(MAX_TOKEN_LEN + 10);
        let mut input = Cursor::new(format!("{long} 8"));
        assert_eq!(next_token(&mut input).unwrap().len(), MAX_TOKEN_LEN);
        assert_eq!(next_token(&mut input).unwrap(), "8");
    }
}
