//! Node configuration, resolved once at startup and passed down explicitly.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::protocol::types::NodeRole;

/// Addresses of the two specialist nodes, known only to the front node.
#[derive(Debug, Clone, Copy)]
pub struct PeerTable {
    pub text: SocketAddr,
    pub pdf: SocketAddr,
}

impl PeerTable {
    /// The outbound address for a remote role. The front node has no peer
    /// entry for itself.
    pub fn addr_of(&self, role: NodeRole) -> Option<SocketAddr> {
        match role {
            NodeRole::Front => None,
            NodeRole::TextStore => Some(self.text),
            NodeRole::DocStore => Some(self.pdf),
        }
    }
}

/// Static configuration for one node.
///
/// `peers` is `Some` on the front node and `None` on specialists, which
/// never initiate forwarding.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub role: NodeRole,
    pub bind: SocketAddr,
    pub storage_root: PathBuf,
    pub peers: Option<PeerTable>,
}
