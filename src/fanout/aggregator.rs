use tracing::{debug, warn};

use crate::protocol::types::{Command, NodeRole, Reply, StoreError};
use crate::routing::dispatcher::Dispatcher;

/// One node's contribution to a fan-out aggregate.
#[derive(Debug)]
pub struct NodeOutcome {
    pub role: NodeRole,
    pub files: Vec<String>,
    pub failed: bool,
}

/// Merges per-role answers for commands that span the whole cluster.
///
/// Remote nodes are queried sequentially, matching the one-round-trip-at-a-
/// time model of the rest of the protocol. Outcome order is always front,
/// text, pdf.
pub struct Aggregator<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> Aggregator<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Lists `path` across all three roles and merges the file names.
    ///
    /// An unreachable node contributes an empty listing (logged, not fatal).
    /// Only when every contribution is empty does the aggregate itself fail
    /// with `NoFilesFound`.
    pub async fn display(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let outcomes = self.collect(path).await?;

        let mut merged = Vec::new();
        for outcome in &outcomes {
            merged.extend(outcome.files.iter().cloned());
        }
        if merged.is_empty() {
            return Err(StoreError::NoFilesFound);
        }
        Ok(merged)
    }

    /// The raw per-node outcomes, ordered front, text, pdf.
    pub async fn collect(&self, path: &str) -> Result<Vec<NodeOutcome>, StoreError> {
        let local_role = self.dispatcher.role();
        let local_files = self
            .dispatcher
            .handler()
            .list_matching(path, Some(local_role.owned_extension()))
            .await?;
        let mut outcomes = vec![NodeOutcome {
            role: local_role,
            files: local_files,
            failed: false,
        }];

        for role in [NodeRole::TextStore, NodeRole::DocStore] {
            if role == local_role {
                continue;
            }
            outcomes.push(self.query_remote(role, path).await);
        }
        Ok(outcomes)
    }

    async fn query_remote(&self, role: NodeRole, path: &str) -> NodeOutcome {
        let command = Command::ListDirectory {
            path: path.to_string(),
        };
        match self.dispatcher.forward(role, &command, None).await {
            Ok(Reply::Listing(files)) => {
                debug!(%role, count = files.len(), "remote listing merged");
                NodeOutcome {
                    role,
                    files,
                    failed: false,
                }
            }
            Ok(Reply::Error(message)) => {
                warn!(%role, %message, "remote listing reported an error");
                NodeOutcome {
                    role,
                    files: Vec::new(),
                    failed: true,
                }
            }
            Ok(_) => {
                warn!(%role, "remote listing replied with an unexpected frame");
                NodeOutcome {
                    role,
                    files: Vec::new(),
                    failed: true,
                }
            }
            Err(e) => {
                warn!(%role, error = %e, "remote listing unavailable");
                NodeOutcome {
                    role,
                    files: Vec::new(),
                    failed: true,
                }
            }
        }
    }
}
