//! Charset re-encoding of document bodies.
//!
//! Documents are authored in UTF-8. When `Content-Type` declares another charset the body
//! is transcoded before it is sent. `ascii`, `latin-1` (`iso-8859-1`) and the `utf-16` family
//! are encoded strictly by their own definition, every other label is resolved with the
//! WHATWG rules implemented by `encoding_rs`.

use encoding_rs::Encoding;
use tracing::debug;

use crate::error::MalformedDocument;

const CHARSET_MARKER: &str = "; charset=";

/// Byte order mark written in front of a plain `utf-16` body.
const UTF16_BOM: u16 = 0xFEFF;

/// Returns the charset declared by a `Content-Type` value, if any.
pub fn content_type_charset(content_type: &str) -> Option<&str> {
    content_type
        .split_once(CHARSET_MARKER)
        .map(|(_, charset)| charset)
        .filter(|charset| !charset.is_empty())
}

/// A charset a body can be encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// 7 bit US-ASCII, anything above U+007F is unmappable.
    Ascii,
    /// ISO-8859-1 proper: U+0000..=U+00FF map to the byte of the same value.
    Latin1,
    /// UTF-16 in little endian order with a leading byte order mark.
    Utf16,
    Utf16Le,
    Utf16Be,
    Whatwg(&'static Encoding),
}

impl Charset {
    /// Resolves a label case-insensitively. `_` and `-` are interchangeable in the ascii,
    /// latin-1 and utf-16 labels.
    ///
    /// Labels `encoding_rs` maps to an encoding it can't encode into (`iso-2022-kr` is the
    /// `replacement` encoding) resolve to `None`.
    pub fn for_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        let charset = match normalized.as_str() {
            "ascii" | "us-ascii" | "646" | "ansi-x3.4-1968" => Self::Ascii,
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "8859" | "cp819" | "l1" | "iso-ir-100" => Self::Latin1,
            "utf-16" | "utf16" | "u16" => Self::Utf16,
            "utf-16le" | "utf-16-le" | "utf16le" => Self::Utf16Le,
            "utf-16be" | "utf-16-be" | "utf16be" => Self::Utf16Be,
            _ => {
                let encoding = Encoding::for_label(label.trim().as_bytes())?;
                if encoding.output_encoding() != encoding {
                    return None;
                }
                Self::Whatwg(encoding)
            }
        };
        Some(charset)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Latin1 => "iso-8859-1",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Encodes `text`, `None` when it holds a character the charset can't represent.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Ascii => text.is_ascii().then(|| text.as_bytes().to_vec()),
            Self::Latin1 => text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect(),
            Self::Utf16 => Some(
                std::iter::once(UTF16_BOM).chain(text.encode_utf16()).flat_map(u16::to_le_bytes).collect(),
            ),
            Self::Utf16Le => Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Self::Utf16Be => Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Self::Whatwg(encoding) => {
                let (encoded, _, unmappable) = encoding.encode(text);
                (!unmappable).then(|| encoded.into_owned())
            }
        }
    }
}

/// Decodes `body` as UTF-8 and encodes it into the charset named by `label`.
pub fn reencode(body: &[u8], label: &str) -> Result<Vec<u8>, MalformedDocument> {
    let charset = Charset::for_label(label).ok_or_else(|| MalformedDocument::unknown_charset(label))?;

    let text = std::str::from_utf8(body)?;
    let encoded = charset.encode(text).ok_or_else(|| MalformedDocument::unmappable_character(label))?;

    debug!(charset = charset.name(), from = body.len(), to = encoded.len(), "re-encoded body");
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_charset() {
        assert_eq!(content_type_charset("text/html; charset=iso-8859-7"), Some("iso-8859-7"));
        assert_eq!(content_type_charset("text/html"), None);
        assert_eq!(content_type_charset("text/html; charset="), None);
        assert_eq!(content_type_charset("text/html;charset=utf-8"), None);
    }

    #[test]
    fn greek_round_trip() {
        let text = "iso-8859-7: Καλημέρα κόσμε";
        let encoded = reencode(text.as_bytes(), "iso-8859-7").unwrap();

        assert_ne!(encoded, text.as_bytes());
        assert!(std::str::from_utf8(&encoded).is_err());

        let (decoded, _, had_errors) = Encoding::for_label(b"iso-8859-7").unwrap().decode(&encoded);
        assert!(!had_errors);
        assert_eq!(decoded, text);
    }

    #[test]
    fn windows_charsets() {
        let text = "windows-1250: Příliš žluťoučký kůň";
        let encoded = reencode(text.as_bytes(), "Windows-1250").unwrap();
        assert!(encoded.starts_with(b"windows-1250"));
        assert!(std::str::from_utf8(&encoded).is_err());
    }

    #[test]
    fn ascii_is_strict() {
        assert_eq!(reencode(b"plain", "us-ascii").unwrap(), b"plain");
        for label in ["ascii", "US-ASCII"] {
            let err = reencode("café".as_bytes(), label).unwrap_err();
            assert!(matches!(err, MalformedDocument::UnmappableCharacter { .. }), "{label}");
        }
    }

    #[test]
    fn latin1_is_not_windows_1252() {
        assert_eq!(reencode("café ÿ".as_bytes(), "latin-1").unwrap(), b"caf\xe9 \xff");
        assert_eq!(reencode("\u{80}".as_bytes(), "ISO_8859_1").unwrap(), [0x80]);

        let err = reencode("€".as_bytes(), "iso-8859-1").unwrap_err();
        assert!(matches!(err, MalformedDocument::UnmappableCharacter { .. }));

        // the WHATWG label still means windows-1252
        assert_eq!(reencode("€".as_bytes(), "windows-1252").unwrap(), [0x80]);
    }

    #[test]
    fn utf16_variants() {
        assert_eq!(reencode(b"hi", "utf-16").unwrap(), [0xFF, 0xFE, b'h', 0, b'i', 0]);
        assert_eq!(reencode(b"hi", "UTF-16LE").unwrap(), [b'h', 0, b'i', 0]);
        assert_eq!(reencode(b"hi", "utf-16be").unwrap(), [0, b'h', 0, b'i']);
        assert_eq!(reencode("😀".as_bytes(), "utf-16be").unwrap(), [0xD8, 0x3D, 0xDE, 0x00]);
    }

    #[test]
    fn unknown_charset() {
        let err = reencode(b"abc", "klingon-1").unwrap_err();
        assert!(matches!(err, MalformedDocument::UnknownCharset { .. }));

        let err = reencode(b"abc", "iso-2022-kr").unwrap_err();
        assert!(matches!(err, MalformedDocument::UnknownCharset { .. }));
    }

    #[test]
    fn invalid_utf8_source() {
        let err = reencode(&[0x66, 0xff, 0x66], "iso-8859-7").unwrap_err();
        assert!(matches!(err, MalformedDocument::InvalidUtf8Body { .. }));
    }

    #[test]
    fn unmappable_character() {
        let err = reencode("snowman ☃".as_bytes(), "iso-8859-7").unwrap_err();
        assert!(matches!(err, MalformedDocument::UnmappableCharacter { .. }));
    }
}
