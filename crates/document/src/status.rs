use std::fmt;

use crate::error::MalformedDocument;

/// Status of a translated document, e.g. `301 Moved Permanently`.
///
/// The reason phrase is kept exactly as the document wrote it, it doesn't need to be the
/// canonical one for the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    code: u16,
    text: String,
}

impl StatusLine {
    /// Parses the first line of a document.
    ///
    /// A line starting with `HTTP` (`HTTP/1.1 200 OK`) keeps everything after the first space,
    /// any other line is taken verbatim (`200 OK`).
    pub fn parse(line: &str) -> Result<Self, MalformedDocument> {
        let status = if line.starts_with("HTTP") { line.split_once(' ').map_or("", |(_, rest)| rest) } else { line };

        let text = status.trim();
        let Some((code, _reason)) = text.split_once(|c: char| c.is_ascii_whitespace()) else {
            return Err(MalformedDocument::invalid_status(line, "status line without a reason phrase"));
        };

        let code = code
            .parse::<u16>()
            .map_err(|e| MalformedDocument::invalid_status(line, format!("status code {code:?}: {e}")))?;

        if !(100..=999).contains(&code) {
            return Err(MalformedDocument::invalid_status(line, format!("status code {code} out of range")));
        }

        Ok(Self { code, text: text.to_string() })
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
