#![allow(dead_code, reason = "each test binary uses a different part of the helpers")]

use std::path::PathBuf;

use asis_server::ServerConfig;
use asis_server::launcher::{Launcher, Task, TaskServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub fn documents() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/documents"))
}

/// A port nothing listens on right now.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    listener.local_addr().unwrap().port()
}

pub fn local_config<P: Into<PathBuf>>(root: P) -> ServerConfig {
    ServerConfig::new(root).host("127.0.0.1").port(free_port())
}

pub async fn start_task_server<P: Into<PathBuf>>(root: P) -> (TaskServer, u16) {
    let config = local_config(root);
    let port = config.bind_port();
    let server = Task::default().start(config).await.unwrap();
    (server, port)
}

#[derive(Debug)]
pub struct RawResponse {
    pub code: u16,
    pub reason: String,
    pub headers: Vec<(String, Vec<u8>)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| std::str::from_utf8(value).unwrap())
    }
}

/// Sends a raw request and reads until the server closes the connection.
pub async fn exchange(port: u16, request: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut received = Vec::new();
    stream.read_to_end(&mut received).await.unwrap();
    received
}

pub async fn request(port: u16, method: &str, path: &str) -> Vec<u8> {
    exchange(port, &format!("{method} {path} HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n")).await
}

pub async fn get(port: u16, path: &str) -> RawResponse {
    parse_response(&request(port, "GET", path).await)
}

pub fn parse_response(bytes: &[u8]) -> RawResponse {
    let mut headers = [httparse::EMPTY_HEADER; 64];
    let mut response = httparse::Response::new(&mut headers);
    let head_size = match response.parse(bytes).unwrap() {
        httparse::Status::Complete(head_size) => head_size,
        httparse::Status::Partial => panic!("incomplete response: {:?}", String::from_utf8_lossy(bytes)),
    };

    RawResponse {
        code: response.code.unwrap(),
        reason: response.reason.unwrap().to_string(),
        headers: response.headers.iter().map(|header| (header.name.to_string(), header.value.to_vec())).collect(),
        body: bytes[head_size..].to_vec(),
    }
}
