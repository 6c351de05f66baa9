mod common;

use asis_server::launcher::{Blocking, ChildProcess, Launcher, RunningServer, Task};
use asis_server::server::{READY_TIMEOUT, check_ready};
use asis_server::{Backend, ServerError, StartupError};

use common::{documents, free_port, get, local_config};

const MISSING_ROOT: &str = "/definitely/not/a/document/root";

#[tokio::test]
async fn task_mode() {
    let config = local_config(documents());
    let port = config.bind_port();

    let mut server = Task::default().start(config).await.unwrap();
    assert!(server.is_ready().await);
    assert_eq!(server.address(), format!("127.0.0.1:{port}"));
    assert_eq!(get(port, "/basic/basic.asis").await.code, 200);

    server.stop().await.unwrap();
    assert!(!check_ready("127.0.0.1", port, READY_TIMEOUT).await);
}

#[tokio::test]
async fn task_mode_reports_server_failure() {
    let result = Task::default().start(local_config(MISSING_ROOT)).await;
    assert!(
        matches!(result, Err(StartupError::Server { source: ServerError::InvalidRoot { .. } })),
        "{result:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_mode() {
    for backend in [Backend::MultiThread, Backend::CurrentThread] {
        let config = local_config(documents()).backend(backend);
        let port = config.bind_port();

        let mut server = Blocking::default().start(config).await.unwrap();
        let response = get(port, "/basic/301.asis").await;
        assert_eq!(response.code, 301, "{backend}");

        server.stop().await.unwrap();
        assert!(!server.is_ready().await, "{backend}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_mode_reports_server_failure() {
    let result = Blocking::default().start(local_config(MISSING_ROOT)).await;
    assert!(
        matches!(result, Err(StartupError::Server { source: ServerError::InvalidRoot { .. } })),
        "{result:?}"
    );
}

#[tokio::test]
async fn child_process_mode() {
    let config = local_config(documents());
    let port = config.bind_port();

    let mut server = ChildProcess::new(env!("CARGO_BIN_EXE_asis")).start(config).await.unwrap();
    assert!(server.id().is_some());

    let response = get(port, "/basic/basic.asis").await;
    assert_eq!(response.code, 200);
    assert!(String::from_utf8(response.body).unwrap().contains("This is a test page"));

    server.stop().await.unwrap();
    assert!(!server.is_ready().await);
}

#[tokio::test]
async fn child_process_exits_early() {
    let result = ChildProcess::new(env!("CARGO_BIN_EXE_asis")).start(local_config(MISSING_ROOT)).await;
    match result {
        Err(StartupError::ChildExited { status }) => assert!(!status.success()),
        other => panic!("unexpected startup result {other:?}"),
    }
}

#[tokio::test]
async fn nothing_listening() {
    assert!(!check_ready("127.0.0.1", free_port(), READY_TIMEOUT).await);
}
