//! The response written back to the client.
//!
//! Document responses carry the status text and headers exactly as the document declared
//! them, so they can't be expressed with `http::Response` (custom reason phrases, values
//! the `http` crate would reject). Responses generated by the server itself are plain text.

use asis_document::{Headers, ParsedResponse};
use bytes::Bytes;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone)]
pub struct AsisResponse {
    status: String,
    headers: Headers,
    body: Bytes,
    head_only: bool,
}

impl AsisResponse {
    /// A response generated by the server, with `content-type` and `content-length` set.
    pub fn plain<B: Into<Bytes>>(status: &str, body: B) -> Self {
        let body = body.into();
        let mut headers = Headers::new();
        headers.insert("content-type", TEXT_PLAIN);
        headers.insert("content-length", body.len().to_string());
        Self { status: status.to_string(), headers, body, head_only: false }
    }

    pub fn not_found() -> Self {
        Self::plain("404 Not Found", "File Not Found")
    }

    pub fn internal_error(diagnostic: &str) -> Self {
        Self::plain("500 Internal Server Error", format!("Internal Server Error\n\n{diagnostic}\n"))
    }

    pub fn bad_request() -> Self {
        Self::plain("400 Bad Request", "Bad Request")
    }

    pub fn method_not_allowed() -> Self {
        let mut response = Self::plain("405 Method Not Allowed", "Method Not Allowed");
        response.headers.insert("allow", "GET, HEAD");
        response
    }

    /// Marks the response as an answer to `HEAD`, the body is not written.
    #[must_use]
    pub fn head_only(mut self) -> Self {
        self.head_only = true;
        self
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn is_head_only(&self) -> bool {
        self.head_only
    }

    /// Whether the client can find the end of this response without the connection closing.
    ///
    /// A `content-length` that doesn't match the body (a document without body section keeps
    /// its declared length) would leave the client waiting, such a response is close delimited.
    /// A `HEAD` answer only needs the header.
    pub fn is_length_delimited(&self) -> bool {
        if self.headers.contains_key("transfer-encoding") {
            return false;
        }

        let Some(content_length) = self.headers.get("content-length") else {
            return false;
        };
        self.head_only || content_length.trim().parse::<usize>().is_ok_and(|length| length == self.body.len())
    }
}

impl From<ParsedResponse> for AsisResponse {
    fn from(parsed: ParsedResponse) -> Self {
        let (status, headers, body) = parsed.into_parts();
        Self { status: status.as_str().to_string(), headers, body, head_only: false }
    }
}
