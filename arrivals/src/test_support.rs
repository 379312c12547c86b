//! A canned-response HTTP server for exercising the clients offline.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Serves the same response to every request on a local port.
pub struct StubServer {
    pub base_url: String,
    requests: mpsc::UnboundedReceiver<String>,
}

impl StubServer {
    /// Start answering every request with `status` and `body`.
    pub async fn start(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let request_line = String::from_utf8_lossy(&request)
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let _ = tx.send(request_line);

                let head = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests: rx,
        }
    }

    /// The request line ("GET /path?query HTTP/1.1") of the next request seen.
    pub async fn next_request(&mut self) -> String {
        self.requests.recv().await.unwrap()
    }

    /// Request lines received and not yet taken.
    pub fn drain_requests(&mut self) -> Vec<String> {
        let mut seen = Vec::new();
        while let Ok(line) = self.requests.try_recv() {
            seen.push(line);
        }
        seen
    }
}

/// A URL on a local port nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
