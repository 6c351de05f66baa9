//! HTTP request decoder
//!
//! Only the request head matters to the server: documents are addressed by path and every
//! supported method is body-less. A request body announced by `Content-Length` is drained
//! so the next request on the connection can be parsed, a `Transfer-Encoding` body is
//! rejected.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only HTTP/1.0 and HTTP/1.1

use bytes::{Buf, BytesMut};
use http::{HeaderMap, Request};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::error::RequestError;

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decodes request heads, skipping any fixed length body that follows them.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    remaining_body: u64,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops already received body bytes, returns true once the whole body is gone.
    fn skip_body(&mut self, src: &mut BytesMut) -> bool {
        let skipped = usize::try_from(self.remaining_body).map_or(src.len(), |remaining| remaining.min(src.len()));
        src.advance(skipped);
        self.remaining_body -= skipped as u64;
        self.remaining_body == 0
    }
}

impl Decoder for RequestDecoder {
    type Item = Request<()>;
    type Error = RequestError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !self.skip_body(src) || src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let parsed_result = req.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => RequestError::TooManyHeaders { limit: MAX_HEADER_NUM },
            e => RequestError::malformed_head(e),
        });

        let head_size = match parsed_result? {
            Status::Complete(head_size) => head_size,
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, RequestError::head_too_large(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
        };

        trace!(head_size, "parsed request head");
        ensure!(head_size <= MAX_HEADER_BYTES, RequestError::head_too_large(head_size, MAX_HEADER_BYTES));

        let version = match req.version {
            Some(0) => http::Version::HTTP_10,
            Some(1) => http::Version::HTTP_11,
            minor => return Err(RequestError::UnsupportedVersion { minor }),
        };

        let mut builder = Request::builder()
            .method(req.method.ok_or_else(|| RequestError::malformed_head("missing method"))?)
            .uri(req.path.ok_or_else(|| RequestError::malformed_head("missing path"))?)
            .version(version);

        for header in req.headers.iter() {
            builder = builder.header(header.name, header.value);
        }

        let request = builder.body(()).map_err(RequestError::malformed_head)?;

        self.remaining_body = body_length(request.headers())?;
        src.advance(head_size);

        Ok(Some(request))
    }
}

fn body_length(headers: &HeaderMap) -> Result<u64, RequestError> {
    if headers.contains_key(http::header::TRANSFER_ENCODING) {
        return Err(RequestError::UnsupportedBody);
    }

    match headers.get(http::header::CONTENT_LENGTH) {
        None => Ok(0),
        Some(value) => {
            let value = value.to_str().map_err(|e| RequestError::invalid_content_length(format!("value can't to_str: {e}")))?;
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| RequestError::invalid_content_length(format!("value {value} is not u64: {e}")))
        }
    }
}
