use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::table;
use crate::archive::builder::ArchiveBuilder;
use crate::config::NodeConfig;
use crate::fanout::aggregator::Aggregator;
use crate::protocol::codec;
use crate::protocol::types::{Command, NodeRole, Reply, StoreError};
use crate::store::handler::NodeHandler;
use crate::store::namespace;

const REMOTE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REMOTE_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes commands on whichever node owns them.
///
/// Runs on every role: on the front node it routes between the local handler,
/// per-request forwarding and the fan-out aggregator; on specialists every
/// supported command resolves locally.
pub struct Dispatcher {
    config: Arc<NodeConfig>,
    handler: NodeHandler,
    archive: ArchiveBuilder,
}

impl Dispatcher {
    pub fn new(config: Arc<NodeConfig>) -> Self {
        let handler = NodeHandler::new(config.role, config.storage_root.clone());
        let archive = ArchiveBuilder::new(config.storage_root.clone());
        Self {
            config,
            handler,
            archive,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.config.role
    }

    pub(crate) fn handler(&self) -> &NodeHandler {
        &self.handler
    }

    /// Runs one command to completion and produces the reply for the caller.
    ///
    /// Namespace and route-table checks happen before any filesystem or
    /// network I/O; a command for a foreign role is forwarded and the remote
    /// reply (success or `ERROR:` line) is relayed unchanged.
    pub async fn dispatch(
        &self,
        command: Command,
        payload: Option<Vec<u8>>,
    ) -> Result<Reply, StoreError> {
        match command {
            Command::Store { name, dest } => {
                namespace::validate(&dest)?;
                namespace::validate_file_name(&name)?;
                let owner = table::route(&name)?;
                let data = payload.unwrap_or_default();
                if owner == self.config.role {
                    self.handler.store(&dest, &name, &data).await?;
                    Ok(Reply::Ok(format!("{} uploaded", name)))
                } else {
                    debug!(%owner, name, "forwarding upload");
                    self.forward(owner, &Command::Store { name, dest }, Some(data))
                        .await
                }
            }

            Command::Retrieve { path } => {
                namespace::validate(&path)?;
                let owner = table::route(&path)?;
                if owner == self.config.role {
                    let (name, bytes) = self.handler.retrieve(&path).await?;
                    Ok(Reply::Data { name, bytes })
                } else {
                    debug!(%owner, path, "forwarding download");
                    self.forward(owner, &Command::Retrieve { path }, None).await
                }
            }

            Command::Delete { path } => {
                namespace::validate(&path)?;
                let owner = table::route(&path)?;
                if owner == self.config.role {
                    self.handler.delete(&path).await?;
                    Ok(Reply::Ok(format!("{} removed", path)))
                } else {
                    debug!(%owner, path, "forwarding removal");
                    self.forward(owner, &Command::Delete { path }, None).await
                }
            }

            Command::ListDirectory { path } => {
                namespace::validate(&path)?;
                if self.config.role == NodeRole::Front {
                    let files = Aggregator::new(self).display(&path).await?;
                    Ok(Reply::Listing(files))
                } else {
                    // A specialist only ever holds its own extension class.
                    let files = self
                        .handler
                        .list_matching(&path, Some(self.config.role.owned_extension()))
                        .await?;
                    Ok(Reply::Listing(files))
                }
            }

            Command::BuildArchive { extension } => {
                let owner = table::owner_of_extension(&extension)?;
                if owner == self.config.role {
                    let (name, bytes) = self.archive.build(&extension).await?;
                    Ok(Reply::Data { name, bytes })
                } else if self.config.role == NodeRole::Front {
                    // Archive extensions are role-exclusive, so this is a
                    // pure proxy with no merging.
                    debug!(%owner, extension, "forwarding archive request");
                    self.forward(owner, &Command::BuildArchive { extension }, None)
                        .await
                } else {
                    Err(StoreError::UnsupportedFileType(extension))
                }
            }
        }
    }

    /// Round-trips one command to a remote node over a fresh connection.
    ///
    /// The connection lives for exactly one request; connect failures,
    /// protocol failures and deadline expiry all surface as that node being
    /// unavailable. No retries.
    pub(crate) async fn forward(
        &self,
        role: NodeRole,
        command: &Command,
        payload: Option<Vec<u8>>,
    ) -> Result<Reply, StoreError> {
        let addr = self
            .config
            .peers
            .as_ref()
            .and_then(|peers| peers.addr_of(role))
            .ok_or(StoreError::RemoteUnavailable(role))?;

        let connect = timeout(REMOTE_CONNECT_TIMEOUT, TcpStream::connect(addr)).await;
        let stream = match connect {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(%role, %addr, error = %e, "failed to connect to node");
                return Err(StoreError::RemoteUnavailable(role));
            }
            Err(_) => {
                warn!(%role, %addr, "connect deadline expired");
                return Err(StoreError::RemoteUnavailable(role));
            }
        };

        let exchange = async {
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);

            codec::write_command(&mut write_half, command).await?;
            if let Some(data) = payload {
                codec::write_payload(&mut write_half, &data).await?;
            }
            codec::read_reply(&mut reader).await
        };

        match timeout(REMOTE_CALL_TIMEOUT, exchange).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                warn!(%role, %addr, error = %e, "forwarded call failed");
                Err(StoreError::RemoteUnavailable(role))
            }
            Err(_) => {
                warn!(%role, %addr, "forwarded call deadline expired");
                Err(StoreError::RemoteUnavailable(role))
            }
        }
    }
}
