//! Content-Encoding compression of document bodies.

use std::fmt;
use std::io;
use std::io::Write;

use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

/// Length of the zlib stream header (CMF + FLG).
const ZLIB_HEADER_LEN: usize = 2;
/// Length of the zlib adler32 trailer.
const ZLIB_TRAILER_LEN: usize = 4;

/// Supported content codings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// Full gzip stream with header, crc32 and size trailer.
    Gzip,
    /// Raw deflate stream, without zlib header and adler32 checksum.
    Deflate,
}

impl Codec {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gzip" => Some(Self::Gzip),
            "deflate" => Some(Self::Deflate),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn compress(body: &[u8], codec: Codec) -> io::Result<Vec<u8>> {
    match codec {
        Codec::Gzip => {
            let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
            encoder.write_all(body)?;
            encoder.finish()
        }

        Codec::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
            encoder.write_all(body)?;
            let zlib = encoder.finish()?;
            Ok(zlib[ZLIB_HEADER_LEN..zlib.len() - ZLIB_TRAILER_LEN].to_vec())
        }
    }
}
