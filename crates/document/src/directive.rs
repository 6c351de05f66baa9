//! Directives carried by the `asis` header.
//!
//! The header value is a `;` separated list of tokens, each one switching off a
//! transformation step of the translator:
//!
//! - `no-charset`: keep the body bytes even when `Content-Type` declares a charset
//! - `no-encoding`: keep the body bytes even when `Content-Encoding` names a codec
//! - `no-header-encode`: keep header values byte for byte (trailing `\r` included)
//!
//! Unknown tokens are ignored.

/// Name of the header that carries the directives, it's never forwarded to the client.
pub const ASIS_HEADER: &str = "asis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    NoCharset,
    NoEncoding,
    NoHeaderEncode,
}

impl Directive {
    /// Parses an already trimmed and lowercased token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "no-charset" => Some(Self::NoCharset),
            "no-encoding" => Some(Self::NoEncoding),
            "no-header-encode" => Some(Self::NoHeaderEncode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    inner: Vec<Directive>,
}

impl Directives {
    pub fn parse(value: &str) -> Self {
        let mut inner = Vec::new();
        for directive in value.split(';').filter_map(|token| Directive::from_token(&token.trim().to_ascii_lowercase())) {
            if !inner.contains(&directive) {
                inner.push(directive);
            }
        }
        Self { inner }
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.inner.contains(&directive)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Directive> + '_ {
        self.inner.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tokens() {
        let directives = Directives::parse(" No-Charset ;no-encoding; no-header-encode");
        assert!(directives.contains(Directive::NoCharset));
        assert!(directives.contains(Directive::NoEncoding));
        assert!(directives.contains(Directive::NoHeaderEncode));
    }

    #[test]
    fn ignore_unknown_tokens() {
        let directives = Directives::parse("whatever; ;no-encoding;no-encoding");
        assert!(!directives.contains(Directive::NoCharset));
        assert!(directives.contains(Directive::NoEncoding));
        assert_eq!(directives.iter().count(), 1);
    }

    #[test]
    fn empty_value() {
        assert!(Directives::parse("").is_empty());
    }
}
