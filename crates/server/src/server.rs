use std::sync::Arc;
use std::time::Duration;

use asis_document::Translator;
use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::connection::HttpConnection;
use crate::error::ServerError;
use crate::handler::DocumentHandler;

/// Default timeout of a single readiness probe.
pub const READY_TIMEOUT: Duration = Duration::from_millis(10);

/// Serves the documents below a root directory.
#[derive(Debug, Clone)]
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Open connections are aborted once the server stops.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let root = self.config.root().to_path_buf();
        if !root.is_dir() {
            return Err(ServerError::InvalidRoot { root });
        }

        let address = self.config.address();
        let tcp_listener = TcpListener::bind((self.config.bind_host(), self.config.bind_port()))
            .await
            .map_err(|source| ServerError::Bind { address: address.clone(), source })?;

        info!(%address, root = %root.display(), "start listening");

        let handler = Arc::new(DocumentHandler::new(Translator::new(root)));
        let mut connections = JoinSet::new();

        tokio::pin!(shutdown);
        loop {
            select! {
                () = &mut shutdown => {
                    info!(%address, open_connections = connections.len(), "shutdown server");
                    return Ok(());
                }

                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        warn!(cause = %e, "connection task failed");
                    }
                }

                accepted = tcp_listener.accept() => {
                    let (tcp_stream, remote_addr) = match accepted {
                        Ok(stream_and_addr) => stream_and_addr,
                        Err(e) => {
                            warn!(cause = %e, "failed to accept");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    connections.spawn(async move {
                        let (reader, writer) = tcp_stream.into_split();
                        let connection = HttpConnection::new(reader, writer);
                        match connection.process(handler).await {
                            Ok(()) => {
                                info!(%remote_addr, "finished process, connection shutdown");
                            }
                            Err(e) => {
                                error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                            }
                        }
                    });
                }
            }
        }
    }

    /// Blocks the current thread until `shutdown` resolves, driving the server on a runtime
    /// of the configured backend.
    pub fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let runtime = self.config.runtime_backend().runtime().map_err(|source| ServerError::Runtime { source })?;
        runtime.block_on(self.serve(shutdown))
    }

    /// Blocks the current thread until Ctrl-C.
    pub fn run(self) -> Result<(), ServerError> {
        self.run_until(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(cause = %e, "listen for ctrl-c error");
            }
        })
    }

    /// Whether the configured address accepts connections right now.
    pub async fn is_ready(&self) -> bool {
        let (host, port) = self.config.connect_address();
        check_ready(&host, port, READY_TIMEOUT).await
    }
}

/// Attempts one TCP connect to `host:port`, bounded by `timeout`.
pub async fn check_ready(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(tokio::time::timeout(timeout, TcpStream::connect((host, port))).await, Ok(Ok(_)))
}
