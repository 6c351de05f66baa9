//! Wire codec of the server
//!
//! - [`RequestDecoder`]: decodes request heads with `httparse`
//! - [`ResponseEncoder`]: writes an [`AsisResponse`](crate::AsisResponse) byte for byte
//!
//! # Example
//!
//! ```no_run
//! use asis_server::codec::{RequestDecoder, ResponseEncoder};
//! use asis_server::AsisResponse;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from("GET /basic.asis HTTP/1.1\r\n\r\n");
//! let request = decoder.decode(&mut request_buffer);
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! encoder.encode(AsisResponse::not_found(), &mut response_buffer).unwrap();
//! ```

mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
