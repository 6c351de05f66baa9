use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;
use thiserror::Error;

/// Failure of a single document translation.
///
/// The serving shell maps [`TranslateError::NotFound`] to `404` and everything else to `500`.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("document {} not found: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed document: {source}")]
    Malformed {
        #[from]
        source: MalformedDocument,
    },
}

impl TranslateError {
    pub fn not_found<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::NotFound { path: path.into(), source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum MalformedDocument {
    #[error("status line is not ascii")]
    NonAsciiStatus,

    #[error("invalid status line {line:?}: {reason}")]
    InvalidStatus { line: String, reason: String },

    #[error("header line {line_no} is not ascii")]
    NonAsciiHeader { line_no: usize },

    #[error("body is not valid utf-8: {source}")]
    InvalidUtf8Body {
        #[from]
        source: Utf8Error,
    },

    #[error("unknown charset {charset:?}")]
    UnknownCharset { charset: String },

    #[error("body contains characters not representable in charset {charset:?}")]
    UnmappableCharacter { charset: String },

    #[error("compress body with {codec} failed: {source}")]
    Compress {
        codec: &'static str,
        #[source]
        source: io::Error,
    },
}

impl MalformedDocument {
    pub fn invalid_status<L: ToString, R: ToString>(line: L, reason: R) -> Self {
        Self::InvalidStatus { line: line.to_string(), reason: reason.to_string() }
    }

    pub fn unknown_charset<S: ToString>(charset: S) -> Self {
        Self::UnknownCharset { charset: charset.to_string() }
    }

    pub fn unmappable_character<S: ToString>(charset: S) -> Self {
        Self::UnmappableCharacter { charset: charset.to_string() }
    }

    pub fn compress(codec: &'static str, source: io::Error) -> Self {
        Self::Compress { codec, source }
    }
}
