//! Translation of "as-is" documents into HTTP responses.
//!
//! An as-is document is a file holding a literal status line, literal headers and a
//! literal body. Serving it replays a response without a live origin server, which is
//! handy when testing HTTP clients against redirects, odd charsets or compressed bodies.
//!
//! # Example
//!
//! ```no_run
//! use asis_document::{Translate, Translator};
//!
//! let translator = Translator::new("tests/documents");
//! let response = translator.translate("basic/basic.asis").unwrap();
//!
//! println!("{}", response.status());
//! for (name, value) in response.headers().iter() {
//!     println!("{name}: {value}");
//! }
//! ```
//!
//! # Transformations
//!
//! Before a body is returned it is re-encoded into the charset declared by `Content-Type`
//! ([`charset`]), compressed with the coding declared by `Content-Encoding` ([`compress`]),
//! and a `Content-Length` present in the document is recomputed. Each step can be switched
//! off with a [`Directive`] in the `asis` header.
//!
//! # Error Handling
//!
//! - [`TranslateError::NotFound`]: the file can't be opened or read
//! - [`TranslateError::Malformed`]: anything else, see [`MalformedDocument`]

pub mod charset;
pub mod compress;

mod directive;
pub use directive::ASIS_HEADER;
pub use directive::Directive;
pub use directive::Directives;

mod error;
pub use error::MalformedDocument;
pub use error::TranslateError;

mod headers;
pub use headers::Headers;

mod status;
pub use status::StatusLine;

mod translator;
#[cfg(any(test, feature = "mock"))]
pub use translator::MockTranslate;
pub use translator::ParsedResponse;
pub use translator::Translate;
pub use translator::Translator;
pub use translator::parse_document;
