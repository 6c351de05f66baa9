use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use http::header::CONNECTION;
use http::{Request, Version};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::error::ConnectionError;
use crate::handler::Handler;
use crate::response::AsisResponse;

/// An HTTP connection answering requests one after the other.
///
/// The connection stays open after a response only when the client asked for it and the
/// response carries a `Content-Length` matching its body. Any other response is delimited by closing the
/// connection, so documents without a length are still sent unchanged.
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    pub async fn process<H: Handler>(mut self, handler: Arc<H>) -> Result<(), ConnectionError> {
        loop {
            match self.framed_read.next().await {
                Some(Ok(request)) => {
                    let keep_alive = wants_keep_alive(&request);
                    let response = handler.call(request).await;
                    let persistent = keep_alive && response.is_length_delimited();

                    debug!(status = response.status(), persistent, "send response");
                    self.framed_write.send(response).await?;

                    if !persistent {
                        self.framed_write.get_mut().shutdown().await?;
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!("can't receive next request, cause {}", e);
                    self.framed_write.send(AsisResponse::bad_request()).await?;
                    self.framed_write.get_mut().shutdown().await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }
}

fn wants_keep_alive(request: &Request<()>) -> bool {
    let connection = request.headers().get(CONNECTION).and_then(|value| value.to_str().ok());
    let has_token = |token: &str| connection.is_some_and(|value| value.split(',').any(|part| part.trim().eq_ignore_ascii_case(token)));

    match request.version() {
        Version::HTTP_11 => !has_token("close"),
        _ => has_token("keep-alive"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::DocumentHandler;
    use asis_document::{MockTranslate, parse_document};
    use tokio::io::{AsyncReadExt, duplex};

    fn document_handler(document: &'static [u8]) -> Arc<DocumentHandler<MockTranslate>> {
        let mut translator = MockTranslate::new();
        translator.expect_translate().returning(move |_| Ok(parse_document(document).unwrap()));
        Arc::new(DocumentHandler::new(translator))
    }

    async fn exchange(handler: Arc<DocumentHandler<MockTranslate>>, request: &[u8]) -> String {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let connection = tokio::spawn(HttpConnection::new(reader, writer).process(handler));

        let (mut client_reader, mut client_writer) = tokio::io::split(client);
        client_writer.write_all(request).await.unwrap();
        client_writer.shutdown().await.unwrap();

        let mut received = Vec::new();
        client_reader.read_to_end(&mut received).await.unwrap();
        let _ = connection.await.unwrap();
        String::from_utf8(received).unwrap()
    }

    #[test]
    fn keep_alive_rules() {
        let http11 = Request::builder().version(Version::HTTP_11).body(()).unwrap();
        assert!(wants_keep_alive(&http11));

        let http11_close = Request::builder().version(Version::HTTP_11).header(CONNECTION, "Close").body(()).unwrap();
        assert!(!wants_keep_alive(&http11_close));

        let http10 = Request::builder().version(Version::HTTP_10).body(()).unwrap();
        assert!(!wants_keep_alive(&http10));

        let http10_keep = Request::builder().version(Version::HTTP_10).header(CONNECTION, "keep-alive").body(()).unwrap();
        assert!(wants_keep_alive(&http10_keep));
    }

    #[tokio::test]
    async fn pipelined_requests_with_length() {
        let handler = document_handler(b"HTTP/1.1 200 OK\nContent-Length: 0\n\nhello");
        let received = exchange(handler, b"GET /a.asis HTTP/1.1\r\n\r\nGET /b.asis HTTP/1.1\r\n\r\n").await;

        assert_eq!(received.matches("HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello").count(), 2);
    }

    #[tokio::test]
    async fn close_delimited_without_length() {
        let handler = document_handler(b"HTTP/1.1 200 OK\nContent-Type: text/plain\n\nhello");
        let received = exchange(handler, b"GET /a.asis HTTP/1.1\r\n\r\nGET /b.asis HTTP/1.1\r\n\r\n").await;

        // the second request is never answered, the connection closes after the body
        assert_eq!(received, "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\n\r\nhello");
    }

    #[tokio::test]
    async fn declared_length_without_body_closes() {
        let handler = document_handler(b"HTTP/1.1 200 OK\nContent-Length: 42");
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let connection = tokio::spawn(HttpConnection::new(reader, writer).process(handler));

        // the client keeps its side open, only the server can end the exchange
        let (mut client_reader, mut client_writer) = tokio::io::split(client);
        client_writer.write_all(b"GET /a.asis HTTP/1.1\r\n\r\n").await.unwrap();

        let mut received = Vec::new();
        tokio::time::timeout(std::time::Duration::from_secs(1), client_reader.read_to_end(&mut received))
            .await
            .expect("connection should be closed after the response")
            .unwrap();

        assert_eq!(received, b"HTTP/1.1 200 OK\r\ncontent-length: 42\r\n\r\n");
        connection.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn bad_request() {
        let handler = document_handler(b"200 OK\n");
        let received = exchange(handler, b"\x01garbage\r\n\r\n").await;
        assert!(received.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }
}
