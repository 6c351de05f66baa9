use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{Level, error, info};

use asis_server::launcher::{ChildProcess, Launcher, RunningServer, Task};
use asis_server::{Backend, DEFAULT_HOST, DEFAULT_PORT, Server, ServerConfig, logging};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunMode {
    /// Serve from this process until Ctrl-C
    Blocking,
    /// Serve from a child process running this binary
    Fork,
    /// Serve from a task of this process' runtime
    Task,
}

/// Serve as-is documents: each file holds the literal response for its path
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the documents
    root: PathBuf,

    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Runtime driving the server
    #[arg(long, value_enum, default_value_t = Backend::MultiThread)]
    backend: Backend,

    #[arg(long, value_enum, default_value_t = RunMode::Blocking)]
    mode: RunMode,

    /// Minimum level of the log events written to stdout
    #[arg(long, default_value_t = logging::DEFAULT_LEVEL)]
    log_level: Level,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig::new(&self.root).host(&self.host).port(self.port).backend(self.backend)
    }
}

type BoxError = Box<dyn Error + Send + Sync>;

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = logging::subscriber(args.log_level);
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = args.config();
    let result: Result<(), BoxError> = match args.mode {
        RunMode::Blocking => Server::new(config).run().map_err(Into::into),
        RunMode::Task => launch(Task::default(), config),
        RunMode::Fork => ChildProcess::current_exe()
            .map_err(Into::into)
            .and_then(|child| launch(child.arg("--log-level").arg(args.log_level.as_str()), config)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "server failed");
            eprintln!("asis: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Starts the server with `launcher` and stops it again on Ctrl-C.
fn launch<L>(launcher: L, config: ServerConfig) -> Result<(), BoxError>
where
    L: Launcher,
{
    let runtime = config.runtime_backend().runtime()?;
    runtime.block_on(async move {
        let mut running = launcher.start(config).await?;
        info!(address = running.address(), "server ready, ctrl-c to stop");

        tokio::signal::ctrl_c().await?;
        running.stop().await?;
        Ok::<(), BoxError>(())
    })
}
