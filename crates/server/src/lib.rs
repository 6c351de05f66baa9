//! A micro HTTP server replaying "as-is" documents
//!
//! Every request path maps 1:1 to a file below the document root. The file holds the
//! literal response (status line, headers, empty line, body) which is translated by
//! [`asis_document`] and written back to the client. Useful to test HTTP clients against
//! redirects, odd charsets, compressed bodies or plainly broken responses.
//!
//! # Example
//!
//! ```no_run
//! use asis_server::launcher::{Launcher, RunningServer, Task};
//! use asis_server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::new("tests/documents").host("127.0.0.1").port(8080);
//!     let mut server = Task::default().start(config).await.expect("server should start");
//!
//!     // GET http://127.0.0.1:8080/basic/basic.asis
//!
//!     server.stop().await.expect("server should stop");
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: request head decoding and byte exact response encoding
//! - [`connection`]: request/response loop of one connection
//! - [`handler`]: maps request paths to documents, `404` and `500` on failures
//! - [`server`]: accept loop, blocking runner and readiness probe
//! - [`launcher`]: run modes (blocking thread, tokio task, child process)
//!
//! # Limitations
//!
//! - HTTP/1.1 only, `GET` and `HEAD`
//! - Request bodies are skipped, chunked request bodies are rejected
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod launcher;
pub mod logging;
pub mod server;

mod config;
pub use config::Backend;
pub use config::ServerConfig;
pub use config::{DEFAULT_HOST, DEFAULT_PORT};

mod error;
pub use error::ConnectionError;
pub use error::RequestError;
pub use error::ServerError;
pub use error::StartupError;

mod response;
pub use response::AsisResponse;

pub use server::Server;

mod utils;
pub(crate) use utils::ensure;
