//! Server configuration.

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tokio::runtime::{Builder, Runtime};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 80;

/// The tokio runtime flavour a server is driven by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Work stealing runtime with one worker per core.
    #[default]
    MultiThread,
    /// Every connection multiplexed on the thread running the server.
    CurrentThread,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiThread => "multi-thread",
            Self::CurrentThread => "current-thread",
        }
    }

    pub fn runtime(self) -> io::Result<Runtime> {
        match self {
            Self::MultiThread => Builder::new_multi_thread().enable_all().build(),
            Self::CurrentThread => Builder::new_current_thread().enable_all().build(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    root: PathBuf,
    host: String,
    port: u16,
    backend: Backend,
}

impl ServerConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into(), host: DEFAULT_HOST.to_string(), port: DEFAULT_PORT, backend: Backend::default() }
    }

    #[must_use]
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bind_host(&self) -> &str {
        &self.host
    }

    pub fn bind_port(&self) -> u16 {
        self.port
    }

    pub fn runtime_backend(&self) -> Backend {
        self.backend
    }

    /// `host:port`, with brackets around IPv6 hosts.
    pub fn address(&self) -> String {
        format_address(&self.host, self.port)
    }

    /// Where a client reaches the server: an unspecified bind address maps to loopback.
    pub fn connect_address(&self) -> (String, u16) {
        let host = match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) if ip.is_unspecified() => "127.0.0.1".to_string(),
            Ok(IpAddr::V6(ip)) if ip.is_unspecified() => "::1".to_string(),
            _ => self.host.clone(),
        };
        (host, self.port)
    }
}

pub(crate) fn format_address(host: &str, port: u16) -> String {
    if host.contains(':') { format!("[{host}]:{port}") } else { format!("{host}:{port}") }
}
