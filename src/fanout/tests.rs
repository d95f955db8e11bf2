//! Fan-out Tests
//!
//! Validates merge order and partial-failure degradation for `display`.
//!
//! *Note: Fan-out across three live nodes is covered by the integration
//! tests in `tests/cluster.rs`; these tests pin the aggregation rules with
//! unreachable peers.*

#[cfg(test)]
mod tests {
    use crate::config::{NodeConfig, PeerTable};
    use crate::fanout::aggregator::Aggregator;
    use crate::protocol::types::{NodeRole, StoreError};
    use crate::routing::dispatcher::Dispatcher;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::Arc;

    async fn front_with_dead_peers(root: &Path) -> Dispatcher {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead: SocketAddr = listener.local_addr().unwrap();
        drop(listener);

        Dispatcher::new(Arc::new(NodeConfig {
            role: NodeRole::Front,
            bind: "127.0.0.1:0".parse().unwrap(),
            storage_root: root.to_path_buf(),
            peers: Some(PeerTable {
                text: dead,
                pdf: dead,
            }),
        }))
    }

    #[tokio::test]
    async fn test_display_degrades_dead_nodes_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("proj")).unwrap();
        std::fs::write(dir.path().join("proj/main.c"), b"int main;").unwrap();
        std::fs::write(dir.path().join("proj/util.c"), b"void util;").unwrap();

        let dispatcher = front_with_dead_peers(dir.path()).await;
        let files = Aggregator::new(&dispatcher)
            .display("~store/proj")
            .await
            .unwrap();

        // Both specialists are down; the aggregate is still served.
        assert_eq!(files, vec!["main.c", "util.c"]);
    }

    #[tokio::test]
    async fn test_outcomes_keep_stable_role_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("proj")).unwrap();
        std::fs::write(dir.path().join("proj/main.c"), b"int main;").unwrap();

        let dispatcher = front_with_dead_peers(dir.path()).await;
        let outcomes = Aggregator::new(&dispatcher)
            .collect("~store/proj")
            .await
            .unwrap();

        let roles: Vec<NodeRole> = outcomes.iter().map(|o| o.role).collect();
        assert_eq!(
            roles,
            vec![NodeRole::Front, NodeRole::TextStore, NodeRole::DocStore]
        );
        assert!(!outcomes[0].failed);
        assert!(outcomes[1].failed && outcomes[1].files.is_empty());
        assert!(outcomes[2].failed && outcomes[2].files.is_empty());
    }

    #[tokio::test]
    async fn test_all_empty_contributions_is_no_files_found() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = front_with_dead_peers(dir.path()).await;

        let err = Aggregator::new(&dispatcher)
            .display("~store/empty")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoFilesFound));
    }

    #[tokio::test]
    async fn test_invalid_path_fails_before_any_query() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = front_with_dead_peers(dir.path()).await;

        let err = Aggregator::new(&dispatcher)
            .display("/var/anywhere")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
