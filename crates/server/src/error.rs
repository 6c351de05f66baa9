use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinError;

/// Failure that ends one client connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("bad request: {source}")]
    Request {
        #[from]
        source: RequestError,
    },

    #[error("write response error: {source}")]
    Write {
        #[from]
        source: io::Error,
    },
}

/// A request head the server can't answer, the client gets a `400`.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request head of {size} bytes exceeds the limit of {limit}")]
    HeadTooLarge { size: usize, limit: usize },

    #[error("request carries more than {limit} headers")]
    TooManyHeaders { limit: usize },

    #[error("malformed request head: {reason}")]
    MalformedHead { reason: String },

    #[error("unsupported http version {minor:?}")]
    UnsupportedVersion { minor: Option<u8> },

    #[error("invalid content-length: {reason}")]
    InvalidContentLength { reason: String },

    #[error("request body with transfer-encoding is not supported")]
    UnsupportedBody,

    #[error("read request error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl RequestError {
    pub fn head_too_large(size: usize, limit: usize) -> Self {
        Self::HeadTooLarge { size, limit }
    }

    pub fn malformed_head<S: ToString>(reason: S) -> Self {
        Self::MalformedHead { reason: reason.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }
}

/// Failure of a running (or starting) server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("document root {} is not a directory", root.display())]
    InvalidRoot { root: PathBuf },

    #[error("bind {address} error: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("build runtime error: {source}")]
    Runtime {
        #[source]
        source: io::Error,
    },

    #[error("server task failed: {source}")]
    Join {
        #[from]
        source: JoinError,
    },

    #[error("server thread panicked")]
    Panicked,

    #[error("stop child process error: {source}")]
    Child {
        #[source]
        source: io::Error,
    },
}

/// Failure while waiting for a launched server to accept connections.
///
/// A server that fails on its own is reported as [`StartupError::Server`] or
/// [`StartupError::ChildExited`], never as a live server answering with errors.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("server failed during startup: {source}")]
    Server {
        #[from]
        source: ServerError,
    },

    #[error("server stopped before accepting connections")]
    Stopped,

    #[error("child process died before accepting connections: {status}")]
    ChildExited { status: ExitStatus },

    #[error("spawn server error: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },

    #[error("server at {address} not ready after {waited:?}")]
    Timeout { address: String, waited: Duration },
}

impl StartupError {
    pub fn spawn<E: Into<io::Error>>(e: E) -> Self {
        Self::Spawn { source: e.into() }
    }
}
