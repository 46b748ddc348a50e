//! The accept loop: binds nothing itself (the caller owns the listener),
//! spawns one handler task per accepted connection, and stops accepting
//! as soon as the shutdown signal fires.

use crate::commands::Dispatcher;
use crate::db::core::Keyspace;
use crate::network::connection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex, Semaphore};
use tracing::{error, info};

/// Accept connections on `listener` until `shutdown` reports `true`.
/// Each connection gets its own task, backed by the same shared
/// `keyspace` and bounded by `max_connections` concurrent handlers.
pub async fn run(
    listener: TcpListener,
    keyspace: Arc<Mutex<Keyspace>>,
    max_connections: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let connection_limit = Arc::new(Semaphore::new(max_connections));

    loop {
        if *shutdown.borrow() {
            return;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, addr)) => {
                        let dispatcher = Dispatcher::new(Arc::clone(&keyspace));
                        let conn_shutdown = shutdown.clone();
                        let limit = Arc::clone(&connection_limit);

                        match limit.try_acquire_owned() {
                            Ok(permit) => {
                                tokio::spawn(async move {
                                    let _permit = permit;
                                    info!(%addr, "client connected");
                                    connection::handle_client(stream, &dispatcher, conn_shutdown).await;
                                    info!(%addr, "client disconnected");
                                });
                            }
                            Err(_) => {
                                error!(%addr, "max connections reached, rejecting client");
                            }
                        }
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_ok() && *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}
