//! Per-connection read loop: buffer partial lines, dispatch one command
//! per line, write the reply, repeat until EOF, an I/O error, or shutdown.

use crate::commands::Dispatcher;
use crate::observability::metrics::{METRIC_ACTIVE_CONNECTIONS, METRIC_CONNECTIONS_TOTAL};
use crate::resp::{strip_line_ending, tokenize_line, RespValue};
use metrics::{counter, gauge};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

struct ConnectionGuard;

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        gauge!(METRIC_ACTIVE_CONNECTIONS).decrement(1.0);
    }
}

/// Drive one client connection to completion.
///
/// Reads into a growing buffer, peels off and processes complete
/// `\n`-terminated lines one at a time (so a pipelined burst of commands
/// is still handled in order), and writes each reply immediately. An
/// empty line is ignored rather than treated as a malformed command.
#[instrument(skip(stream, dispatcher, shutdown), fields(connection_id = %Uuid::new_v4()))]
pub async fn handle_client(
    mut stream: TcpStream,
    dispatcher: &Dispatcher,
    mut shutdown: watch::Receiver<bool>,
) {
    counter!(METRIC_CONNECTIONS_TOTAL).increment(1);
    gauge!(METRIC_ACTIVE_CONNECTIONS).increment(1.0);
    let _guard = ConnectionGuard;

    info!("connection established");

    let mut buffer: Vec<u8> = Vec::new();
    let mut read_buf = [0u8; 4096];

    loop {
        if let Some(newline_at) = buffer.iter().position(|&b| b == b'\n') {
            let line_bytes = buffer.drain(..=newline_at).collect::<Vec<u8>>();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = strip_line_ending(&line);

            if line.trim().is_empty() {
                continue;
            }

            let reply = match tokenize_line(line) {
                Ok(tokens) if tokens.is_empty() => continue,
                Ok(tokens) => dispatcher.execute(tokens).await,
                Err(msg) => RespValue::Error(format!("ERR {}", msg)),
            };

            if let Err(e) = stream.write_all(reply.serialize().as_bytes()).await {
                error!(error = %e, "failed to write reply");
                return;
            }
            continue;
        }

        tokio::select! {
            read_result = stream.read(&mut read_buf) => {
                match read_result {
                    Ok(0) => {
                        debug!("client closed the connection");
                        return;
                    }
                    Ok(n) => buffer.extend_from_slice(&read_buf[..n]),
                    Err(e) => {
                        error!(error = %e, "failed to read from socket");
                        return;
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("connection closing for server shutdown");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::core::Keyspace;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    async fn spawn_server() -> (std::net::SocketAddr, watch::Sender<bool>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let dispatcher = Dispatcher::new(Arc::new(Mutex::new(Keyspace::new())));
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                handle_client(stream, &dispatcher, rx).await;
            }
        });

        (addr, tx)
    }

    #[tokio::test]
    async fn handles_a_single_command_line() {
        let (addr, _tx) = spawn_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"PING\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"+PONG\r\n");
    }

    #[tokio::test]
    async fn handles_pipelined_commands_in_order() {
        let (addr, _tx) = spawn_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"SET a 1\nGET a\n").await.unwrap();

        let mut buf = [0u8; 128];
        let n = client.read(&mut buf).await.unwrap();
        let mut received = buf[..n].to_vec();
        while received.matches(&b"\r\n"[..]).count() < 2 {
            let n = client.read(&mut buf).await.unwrap();
            received.extend_from_slice(&buf[..n]);
        }
        assert_eq!(received, b"+OK\r\n+1\r\n");
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let (addr, _tx) = spawn_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"\nPING\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"+PONG\r\n");
    }
}
