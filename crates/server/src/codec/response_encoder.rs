//! Serializes an [`AsisResponse`] into raw bytes.
//!
//! The status text and every header are written exactly as stored, no header is added:
//! a document without `Content-Length` is sent close delimited by the connection.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::response::AsisResponse;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<AsisResponse> for ResponseEncoder {
    type Error = io::Error;

    fn encode(&mut self, item: AsisResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE + item.body().len());

        write!(FastWrite(dst), "HTTP/1.1 {}\r\n", item.status())?;

        for (name, value) in item.headers().iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");

        if !item.is_head_only() {
            dst.put_slice(item.body());
        }
        Ok(())
    }
}

/// Writer over `BytesMut` for the formatted status line, space is reserved up front.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
