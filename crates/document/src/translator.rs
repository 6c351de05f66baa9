//! Translation of as-is documents into HTTP responses.
//!
//! A document is the literal response a server would have sent:
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: text/html; charset=iso-8859-7
//! Content-Length: 12
//!
//! <raw body bytes>
//! ```
//!
//! # Pipeline
//!
//! 1. split the file on `\n`, line endings are not normalized
//! 2. the first line is the status, with or without the `HTTP/x.y` prefix
//! 3. header lines up to the first empty line, split on the first `": "`
//! 4. the `asis` header is pulled out and parsed into [`Directives`]
//! 5. the rest of the file is the body, re-encoded into the declared charset and then
//!    compressed with the declared content coding, unless a directive says otherwise
//! 6. a `Content-Length` present in the document is recomputed from the final body

use std::fs;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::charset::{content_type_charset, reencode};
use crate::compress::{Codec, compress};
use crate::directive::{ASIS_HEADER, Directive, Directives};
use crate::error::{MalformedDocument, TranslateError};
use crate::headers::Headers;
use crate::status::StatusLine;

const HEADER_SEPARATOR: &[u8] = b": ";

/// The response derived from one document.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    status: StatusLine,
    headers: Headers,
    body: Bytes,
    directives: Directives,
}

impl ParsedResponse {
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Headers to send, never contains the `asis` header.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Directives the document carried in its `asis` header.
    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    pub fn into_parts(self) -> (StatusLine, Headers, Bytes) {
        (self.status, self.headers, self.body)
    }
}

/// Something able to turn a path relative to a document root into a response.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Translate {
    fn translate(&self, relative: &str) -> Result<ParsedResponse, TranslateError>;
}

/// Reads documents below `root`, fresh on every call.
#[derive(Debug, Clone)]
pub struct Translator {
    root: PathBuf,
}

impl Translator {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, TranslateError> {
        let relative_path = Path::new(relative);
        let escapes = relative_path.components().any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            let source = std::io::Error::new(std::io::ErrorKind::NotFound, "path escapes the document root");
            return Err(TranslateError::not_found(relative_path, source));
        }
        Ok(self.root.join(relative_path))
    }
}

impl Translate for Translator {
    fn translate(&self, relative: &str) -> Result<ParsedResponse, TranslateError> {
        let path = self.resolve(relative)?;

        debug!(path = %path.display(), "opening document");
        let bytes = fs::read(&path).map_err(|e| TranslateError::not_found(&path, e))?;

        Ok(parse_document(&bytes)?)
    }
}

/// Runs the whole translation pipeline over the raw bytes of a document.
pub fn parse_document(bytes: &[u8]) -> Result<ParsedResponse, MalformedDocument> {
    let lines = bytes.split(|b| *b == b'\n').collect::<Vec<_>>();

    debug!("reading status line");
    let status_line = ascii(lines[0]).ok_or(MalformedDocument::NonAsciiStatus)?;
    let status = StatusLine::parse(status_line)?;

    let end_of_headers = lines.iter().position(|line| line.is_empty()).unwrap_or(lines.len());
    debug!(end_of_headers, lines = lines.len(), "found end of headers");

    let mut headers = Headers::new();
    for (index, line) in lines.iter().enumerate().take(end_of_headers).skip(1) {
        let (key, value) = split_header(line);
        let (Some(key), Some(value)) = (ascii(key), ascii(value)) else {
            return Err(MalformedDocument::NonAsciiHeader { line_no: index + 1 });
        };
        headers.insert(key, value);
    }

    let directives = headers.remove(ASIS_HEADER).map(|value| Directives::parse(&value)).unwrap_or_default();

    if !directives.contains(Directive::NoHeaderEncode) {
        headers = headers.into_iter().map(|(name, value)| (strip_carriage_return(name), strip_carriage_return(value))).collect();
    }

    if end_of_headers == lines.len() {
        debug!("document has no body");
        return Ok(ParsedResponse { status, headers, body: Bytes::new(), directives });
    }

    let mut body = lines[end_of_headers + 1..].join(&b'\n');

    if let Some(charset) = headers.get("content-type").and_then(content_type_charset) {
        if directives.contains(Directive::NoCharset) {
            debug!(charset, "skip charset re-encoding");
        } else {
            body = reencode(&body, charset)?;
        }
    }

    if let Some(encoding) = headers.get("content-encoding").filter(|encoding| !encoding.is_empty()) {
        if directives.contains(Directive::NoEncoding) {
            debug!(encoding, "skip content encoding");
        } else if let Some(codec) = Codec::from_name(encoding) {
            debug!(%codec, "encoding body");
            body = compress(&body, codec).map_err(|e| MalformedDocument::compress(codec.name(), e))?;
        } else {
            warn!(encoding, "content encoding not supported, body sent unchanged");
        }
    }

    if let Some(content_length) = headers.get_mut("content-length") {
        *content_length = body.len().to_string();
    }

    debug!(status = %status, headers = headers.len(), body = body.len(), "translated document");
    Ok(ParsedResponse { status, headers, body: Bytes::from(body), directives })
}

/// Splits a header line on the first `": "`, a line without it is all key.
fn split_header(line: &[u8]) -> (&[u8], &[u8]) {
    match line.windows(HEADER_SEPARATOR.len()).position(|window| window == HEADER_SEPARATOR) {
        Some(index) => (&line[..index], &line[index + HEADER_SEPARATOR.len()..]),
        None => (line, &[]),
    }
}

fn strip_carriage_return(mut text: String) -> String {
    if text.ends_with('\r') {
        text.pop();
    }
    text
}

fn ascii(bytes: &[u8]) -> Option<&str> {
    if bytes.is_ascii() { std::str::from_utf8(bytes).ok() } else { None }
}
