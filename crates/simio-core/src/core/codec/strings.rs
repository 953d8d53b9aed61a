use std::borrow::Cow;
use tracing::warn;

/// Longest string a text field carries, in bytes.
pub const MAX_TEXT_STRING: usize = 255;

/// Token standing for the empty string.
pub const EMPTY_TEXT_STRING: &str = r"\e";

/// Turns a string into one whitespace-free, comment-free token.
///
/// Spaces become `_`. Characters the tokenizer would split or swallow are
/// backslash-escaped: `\t`, `\n`, `\r`, `\\`, `\_` for a literal underscore
/// and `\xHH` for `;` and any other ASCII control or whitespace byte. The
/// empty string is written as [`EMPTY_TEXT_STRING`].
///
/// Input longer than [`MAX_TEXT_STRING`] bytes is cut at the nearest character
/// boundary and the truncation is reported.
pub fn encode_text_string(src: &str) -> String {
    let kept = truncate(src);
    if kept.len() < src.len() {
        warn!("String '{}' truncated to {} bytes", src, kept.len());
    }
    if kept.is_empty() {
        return EMPTY_TEXT_STRING.to_string();
    }

    let mut encoded = String::with_capacity(kept.len());
    for c in kept.chars() {
        match c {
            ' ' => encoded.push('_'),
            '_' => encoded.push_str(r"\_"),
            '\\' => encoded.push_str(r"\\"),
            '\t' => encoded.push_str(r"\t"),
            '\n' => encoded.push_str(r"\n"),
            '\r' => encoded.push_str(r"\r"),
            c if c == ';' || c.is_ascii_whitespace() || c.is_ascii_control() => {
                encoded.push_str(&format!(r"\x{:02x}", c as u32))
            }
            c => encoded.push(c),
        }
    }
    encoded
}

/// Reverses [`encode_text_string`]. A bare `_` becomes a space.
///
/// Unknown escapes are kept as written.
pub fn decode_text_string(src: &str) -> String {
    if src == EMPTY_TEXT_STRING {
        return String::new();
    }

    let mut decoded = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '_' => decoded.push(' '),
            '\\' => match chars.next() {
                Some('_') => decoded.push('_'),
                Some('\\') => decoded.push('\\'),
                Some('t') => decoded.push('\t'),
                Some('n') => decoded.push('\n'),
                Some('r') => decoded.push('\r'),
                Some('x') => {
                    let hex: String = (0..2).filter_map(|_| chars.next_if(char::is_ascii_hexdigit)).collect();
                    match u8::from_str_radix(&hex, 16) {
                        Ok(byte) if hex.len() == 2 => decoded.push(char::from(byte)),
                        _ => {
                            decoded.push_str(r"\x");
                            decoded.push_str(&hex);
                        }
                    }
                }
                Some(other) => {
                    decoded.push('\\');
                    decoded.push(other);
                }
                None => decoded.push('\\'),
            },
            c => decoded.push(c),
        }
    }

    let kept = truncate(&decoded);
    if kept.len() < decoded.len() {
        warn!("String '{}' truncated to {} bytes", decoded, kept.len());
        return kept.into_owned();
    }
    decoded
}

fn truncate(src: &str) -> Cow<'_, str> {
    if src.len() <= MAX_TEXT_STRING {
        return Cow::Borrowed(src);
    }
    let mut end = MAX_TEXT_STRING;
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Borrowed(&src[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) -> String {
        decode_text_string(&encode_text_string(text))
    }

    #[test]
    fn encoded_strings_are_single_tokens() {
        let encoded = encode_text_string("Protein in water\tbox; take 2\n");
        assert_eq!(encoded, r"Protein_in_water\tbox\x3b_take_2\n");
        assert!(!encoded.contains(char::is_whitespace));
        assert!(!encoded.contains(';'));
    }

    #[test]
    fn spaces_and_tabs_round_trip_exactly() {
        for text in ["hello world, twice  spaced", "a\tb", "\tleading tab", "mixed \t run"] {
            assert_eq!(round_trip(text), text);
        }
    }

    #[test]
    fn underscores_and_backslashes_round_trip() {
        for text in ["snake_case name", r"C:\path\_x", r"\e", "trailing\\"] {
            assert_eq!(round_trip(text), text);
        }
    }

    #[test]
    fn empty_string_has_its_own_token() {
        assert_eq!(encode_text_string(""), EMPTY_TEXT_STRING);
        assert_eq!(round_trip(""), "");
    }

    #[test]
    fn bare_underscores_read_as_spaces() {
        assert_eq!(decode_text_string("Protein_in_water"), "Protein in water");
    }

    #[test]
    fn unknown_escapes_are_kept() {
        assert_eq!(decode_text_string(r"a\qb"), r"a\qb");
        assert_eq!(decode_text_string(r"a\xZZ"), r"a\xZZ");
    }

    #[test]
    fn long_strings_are_truncated_not_rejected() {
        let long = "x".repeat(MAX_TEXT_STRING + 40);
        assert_eq!(encode_text_string(&long).len(), MAX_TEXT_STRING);
        assert_eq!(decode_text_string(&long).len(), MAX_TEXT_STRING);
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        let long = "é".repeat(MAX_TEXT_STRING);
        let encoded = encode_text_string(&long);
        assert!(encoded.len() <= MAX_TEXT_STRING);
        assert!(encoded.chars().all(|c| c == 'é'));
    }
}
