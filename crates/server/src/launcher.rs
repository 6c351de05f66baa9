//! Run modes of the server.
//!
//! A [`Launcher`] starts a [`Server`] somewhere and waits until it accepts connections:
//!
//! - [`Blocking`]: a dedicated thread blocked on its own runtime
//! - [`Task`]: a task on the caller's tokio runtime
//! - [`ChildProcess`]: a separate process running the `asis` binary
//!
//! Readiness is polled with [`check_ready`]. When the server fails before it becomes ready
//! the failure is handed back to the caller of [`Launcher::start`] instead of being lost.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::thread::JoinHandle as ThreadHandle;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, StartupError};
use crate::server::{READY_TIMEOUT, Server, check_ready};

/// Pause between two readiness probes.
const PROBE_INTERVAL: Duration = Duration::from_millis(5);

/// How long a launcher waits for the server before giving up.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Launcher {
    type Running: RunningServer;

    /// Starts the server and returns once it accepts connections.
    async fn start(self, config: ServerConfig) -> Result<Self::Running, StartupError>;
}

#[async_trait]
pub trait RunningServer: Send {
    /// `host:port` the server was configured with.
    fn address(&self) -> &str;

    async fn is_ready(&self) -> bool;

    /// Stops the server and waits until it is gone.
    async fn stop(&mut self) -> Result<(), ServerError>;
}

/// Polls readiness until the server accepts connections, `failed` reports a server that
/// will never become ready.
async fn wait_ready<F>(config: &ServerConfig, startup_timeout: Duration, mut failed: F) -> Result<(), StartupError>
where
    F: FnMut() -> Option<StartupError> + Send,
{
    let (host, port) = config.connect_address();
    let started = Instant::now();
    loop {
        if let Some(e) = failed() {
            return Err(e);
        }

        if check_ready(&host, port, READY_TIMEOUT).await {
            info!(address = %config.address(), waited = ?started.elapsed(), "server started");
            return Ok(());
        }

        if started.elapsed() > startup_timeout {
            return Err(StartupError::Timeout { address: config.address(), waited: started.elapsed() });
        }

        tokio::time::sleep(PROBE_INTERVAL).await;
    }
}

/// Runs the server on a dedicated thread, blocked on a runtime of the configured backend.
#[derive(Debug, Clone)]
pub struct Blocking {
    startup_timeout: Duration,
}

impl Default for Blocking {
    fn default() -> Self {
        Self { startup_timeout: DEFAULT_STARTUP_TIMEOUT }
    }
}

impl Blocking {
    #[must_use]
    pub fn startup_timeout(mut self, startup_timeout: Duration) -> Self {
        self.startup_timeout = startup_timeout;
        self
    }
}

#[derive(Debug)]
pub struct BlockingServer {
    config: ServerConfig,
    address: String,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<ThreadHandle<Result<(), ServerError>>>,
}

#[async_trait]
impl Launcher for Blocking {
    type Running = BlockingServer;

    async fn start(self, config: ServerConfig) -> Result<BlockingServer, StartupError> {
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = Server::new(config.clone());
        let thread = std::thread::Builder::new()
            .name("asis-server".to_string())
            .spawn(move || {
                server.run_until(async move {
                    let _ = shutdown_rx.await;
                })
            })
            .map_err(StartupError::spawn)?;

        let mut thread = Some(thread);
        let ready = wait_ready(&config, self.startup_timeout, || {
            if thread.as_ref().is_some_and(ThreadHandle::is_finished) {
                let finished = thread.take()?;
                return Some(match finished.join() {
                    Ok(Ok(())) => StartupError::Stopped,
                    Ok(Err(e)) => e.into(),
                    Err(_) => ServerError::Panicked.into(),
                });
            }
            None
        })
        .await;

        let mut running = BlockingServer { address: config.address(), config, shutdown: Some(shutdown), thread };
        if let Err(e) = ready {
            // the thread may still be running when the deadline passed
            let _ = running.stop().await;
            return Err(e);
        }
        Ok(running)
    }
}

#[async_trait]
impl RunningServer for BlockingServer {
    fn address(&self) -> &str {
        &self.address
    }

    async fn is_ready(&self) -> bool {
        let (host, port) = self.config.connect_address();
        check_ready(&host, port, READY_TIMEOUT).await
    }

    async fn stop(&mut self) -> Result<(), ServerError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        match tokio::task::spawn_blocking(move || thread.join()).await? {
            Ok(result) => result,
            Err(_) => Err(ServerError::Panicked),
        }
    }
}

/// Runs the server as a task on the current tokio runtime.
#[derive(Debug, Clone)]
pub struct Task {
    startup_timeout: Duration,
}

impl Default for Task {
    fn default() -> Self {
        Self { startup_timeout: DEFAULT_STARTUP_TIMEOUT }
    }
}

impl Task {
    #[must_use]
    pub fn startup_timeout(mut self, startup_timeout: Duration) -> Self {
        self.startup_timeout = startup_timeout;
        self
    }
}

#[derive(Debug)]
pub struct TaskServer {
    config: ServerConfig,
    address: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), ServerError>>>,
}

#[async_trait]
impl Launcher for Task {
    type Running = TaskServer;

    async fn start(self, config: ServerConfig) -> Result<TaskServer, StartupError> {
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(Server::new(config.clone()).serve(async move {
            let _ = shutdown_rx.await;
        }));

        let ready = {
            let handle = &handle;
            wait_ready(&config, self.startup_timeout, || handle.is_finished().then_some(StartupError::Stopped)).await
        };

        match ready {
            Ok(()) => Ok(TaskServer { address: config.address(), config, shutdown: Some(shutdown), handle: Some(handle) }),
            // re-raise the failure of the task to the waiter
            Err(StartupError::Stopped) => Err(match handle.await {
                Ok(Ok(())) => StartupError::Stopped,
                Ok(Err(e)) => e.into(),
                Err(e) => ServerError::from(e).into(),
            }),
            Err(e) => {
                handle.abort();
                Err(e)
            }
        }
    }
}

#[async_trait]
impl RunningServer for TaskServer {
    fn address(&self) -> &str {
        &self.address
    }

    async fn is_ready(&self) -> bool {
        let (host, port) = self.config.connect_address();
        check_ready(&host, port, READY_TIMEOUT).await
    }

    async fn stop(&mut self) -> Result<(), ServerError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        match self.handle.take() {
            Some(handle) => handle.await?,
            None => Ok(()),
        }
    }
}

/// Runs the server in a child process executing the `asis` binary.
///
/// The child gets the configuration on its command line and always runs in blocking
/// mode, extra arguments (e.g. `--log-level debug`) are appended as given.
#[derive(Debug, Clone)]
pub struct ChildProcess {
    program: PathBuf,
    args: Vec<OsString>,
    startup_timeout: Duration,
}

impl ChildProcess {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self { program: program.into(), args: Vec::new(), startup_timeout: DEFAULT_STARTUP_TIMEOUT }
    }

    /// Re-executes the running binary.
    pub fn current_exe() -> std::io::Result<Self> {
        std::env::current_exe().map(Self::new)
    }

    #[must_use]
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn startup_timeout(mut self, startup_timeout: Duration) -> Self {
        self.startup_timeout = startup_timeout;
        self
    }

    fn command(&self, config: &ServerConfig) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(config.root())
            .arg("--host")
            .arg(config.bind_host())
            .arg("--port")
            .arg(config.bind_port().to_string())
            .arg("--backend")
            .arg(config.runtime_backend().as_str())
            .arg("--mode")
            .arg("blocking")
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[derive(Debug)]
pub struct ChildServer {
    config: ServerConfig,
    address: String,
    child: Child,
}

impl ChildServer {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

#[async_trait]
impl Launcher for ChildProcess {
    type Running = ChildServer;

    async fn start(self, config: ServerConfig) -> Result<ChildServer, StartupError> {
        info!(program = %self.program.display(), backend = %config.runtime_backend(), "forking server");
        let mut child = self.command(&config).spawn().map_err(StartupError::spawn)?;

        let ready = wait_ready(&config, self.startup_timeout, || match child.try_wait() {
            Ok(Some(status)) => Some(StartupError::ChildExited { status }),
            Ok(None) => None,
            Err(e) => Some(StartupError::spawn(e)),
        })
        .await;

        if let Err(e) = ready {
            if !matches!(e, StartupError::ChildExited { .. }) {
                let _ = child.kill().await;
            }
            return Err(e);
        }

        info!(pid = ?child.id(), "server started in child process");
        Ok(ChildServer { address: config.address(), config, child })
    }
}

#[async_trait]
impl RunningServer for ChildServer {
    fn address(&self) -> &str {
        &self.address
    }

    async fn is_ready(&self) -> bool {
        let (host, port) = self.config.connect_address();
        check_ready(&host, port, READY_TIMEOUT).await
    }

    async fn stop(&mut self) -> Result<(), ServerError> {
        if let Err(e) = self.child.start_kill() {
            // already exited
            warn!(cause = %e, "kill child process error");
        }
        self.child.wait().await.map_err(|source| ServerError::Child { source })?;
        Ok(())
    }
}
