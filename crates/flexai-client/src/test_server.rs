//! Hand-driven HTTP/1.1 server for tests that need exact control over
//! response timing and when the connection closes.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Status line and headers for a close-delimited event stream.
pub(crate) const SSE_HEAD: &[u8] =
    b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n";

pub(crate) struct ScriptedServer {
    /// Base URL to point a session at.
    pub url: String,
    /// Fires once the connection is finished: after the last write, or
    /// with `hold_open`, once the client has hung up.
    pub closed: oneshot::Receiver<()>,
}

/// Accept one connection, read the request, then write each part after its
/// delay.
///
/// With `hold_open` the socket stays open after the last part until the
/// client closes it; otherwise the server shuts down its write half.
pub(crate) async fn scripted_server(
    parts: Vec<(Duration, Vec<u8>)>,
    hold_open: bool,
) -> ScriptedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;

        for (delay, bytes) in parts {
            tokio::time::sleep(delay).await;
            if socket.write_all(&bytes).await.is_err() {
                let _ = closed_tx.send(());
                return;
            }
        }

        if hold_open {
            let mut buf = [0u8; 256];
            while let Ok(n) = socket.read(&mut buf).await {
                if n == 0 {
                    break;
                }
            }
        } else {
            let _ = socket.shutdown().await;
        }
        let _ = closed_tx.send(());
    });

    ScriptedServer {
        url: format!("http://{addr}"),
        closed,
    }
}

/// One `data: ` line per value, newline-terminated.
pub(crate) fn data_line(json: &str) -> Vec<u8> {
    format!("data: {json}\n").into_bytes()
}

/// Read up to the end of the request body (headers plus `content-length`).
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}
