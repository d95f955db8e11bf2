//! Connection handling: one listener per node, one worker task per accepted
//! connection. Workers share nothing mutable; each request owns its own
//! buffers and the immutable configuration is behind an `Arc`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::NodeConfig;
use crate::protocol::codec;
use crate::protocol::types::{Command, ProtocolError, Reply};
use crate::routing::dispatcher::Dispatcher;

pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Binds the node's listener. Separated from [`Server::run`] so callers
    /// (and tests) can learn the bound address before serving.
    pub async fn bind(config: NodeConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind).await?;
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(config)));
        Ok(Self {
            listener,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Each connection gets its own task; finished workers are
    /// reaped from the set instead of being detached.
    pub async fn run(self) -> Result<()> {
        let role = self.dispatcher.role();
        info!(%role, addr = %self.listener.local_addr()?, "node listening");

        let mut workers = JoinSet::new();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(%peer, "client connected");
                            let dispatcher = self.dispatcher.clone();
                            workers.spawn(async move {
                                handle_connection(stream, peer, dispatcher).await;
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                        }
                    }
                }
                Some(finished) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "connection worker aborted");
                    }
                }
            }
        }
    }
}

/// Serves one client connection until it closes or the stream desyncs.
///
/// State machine per command: await command, read payload if the command
/// carries one, dispatch, respond. A malformed command line is answered and
/// the connection continues; a broken transfer ends it.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, dispatcher: Arc<Dispatcher>) {
    let conn_id = Uuid::new_v4();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let command = match codec::read_command(&mut reader).await {
            Ok(Some(command)) => command,
            Ok(None) => {
                debug!(%conn_id, %peer, "client disconnected");
                return;
            }
            Err(ProtocolError::Io(e)) => {
                warn!(%conn_id, %peer, error = %e, "connection lost");
                return;
            }
            Err(e) => {
                warn!(%conn_id, %peer, error = %e, "bad command line");
                let reply = Reply::Error(e.to_string());
                if codec::write_reply(&mut write_half, &reply).await.is_err() {
                    return;
                }
                continue;
            }
        };

        let payload = if matches!(command, Command::Store { .. }) {
            match codec::read_payload(&mut reader).await {
                Ok(data) => Some(data),
                Err(e) => {
                    // The byte stream is no longer aligned with the
                    // protocol; answer and drop the connection.
                    warn!(%conn_id, %peer, error = %e, "payload transfer failed");
                    let reply = Reply::Error(e.to_string());
                    let _ = codec::write_reply(&mut write_half, &reply).await;
                    return;
                }
            }
        } else {
            None
        };

        debug!(%conn_id, %peer, verb = command.verb(), "dispatching command");
        let reply = match dispatcher.dispatch(command, payload).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(%conn_id, %peer, error = %e, "command failed");
                Reply::Error(e.to_string())
            }
        };

        if let Err(e) = codec::write_reply(&mut write_half, &reply).await {
            warn!(%conn_id, %peer, error = %e, "failed to send reply");
            return;
        }
    }
}
