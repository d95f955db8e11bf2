//! Local Storage Tests
//!
//! Validates namespace containment and the per-node handler contract.
//!
//! ## Test Scopes
//! - **Namespace**: Root rewriting, traversal rejection, prefix enforcement.
//! - **Handler**: Store/retrieve/delete round trips, overwrite semantics,
//!   delete idempotence, listing filters.

#[cfg(test)]
mod tests {
    use crate::protocol::types::{NodeRole, StoreError};
    use crate::store::handler::NodeHandler;
    use crate::store::namespace::{basename, translate, validate};
    use std::path::Path;

    fn handler(root: &Path) -> NodeHandler {
        NodeHandler::new(NodeRole::TextStore, root.to_path_buf())
    }

    // ============================================================
    // NAMESPACE TESTS
    // ============================================================

    #[test]
    fn test_translate_rewrites_namespace_root() {
        let root = Path::new("/var/node/text");
        let local = translate(root, "~store/docs/report.txt").unwrap();
        assert_eq!(local, root.join("docs/report.txt"));
    }

    #[test]
    fn test_translate_accepts_bare_root() {
        let root = Path::new("/var/node/text");
        assert_eq!(translate(root, "~store").unwrap(), root);
        assert_eq!(translate(root, "~store/").unwrap(), root);
    }

    #[test]
    fn test_translate_rejects_foreign_prefix() {
        let root = Path::new("/var/node/text");
        for bad in ["/etc/passwd", "store/docs", "~storehouse/docs", "", "~"] {
            assert!(
                matches!(translate(root, bad), Err(StoreError::InvalidPath(_))),
                "path {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_translate_rejects_traversal() {
        let root = Path::new("/var/node/text");
        for bad in [
            "~store/../outside",
            "~store/docs/../../outside",
            "~store/./docs",
        ] {
            assert!(
                matches!(translate(root, bad), Err(StoreError::InvalidPath(_))),
                "path {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_matches_translate() {
        assert!(validate("~store/docs/report.txt").is_ok());
        assert!(validate("/tmp/report.txt").is_err());
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("~store/docs/report.txt"), "report.txt");
        assert_eq!(basename("report.txt"), "report.txt");
    }

    // ============================================================
    // HANDLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_store_and_retrieve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let content = b"hello from the text store".to_vec();
        handler
            .store("~store/docs", "report.txt", &content)
            .await
            .unwrap();

        let (name, data) = handler
            .retrieve("~store/docs/report.txt")
            .await
            .unwrap();
        assert_eq!(name, "report.txt");
        assert_eq!(data, content);
    }

    #[tokio::test]
    async fn test_store_creates_missing_directories_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        handler
            .store("~store/a/b/c", "one.txt", b"1")
            .await
            .unwrap();
        // Same directory again is not an error.
        handler
            .store("~store/a/b/c", "two.txt", b"2")
            .await
            .unwrap();

        assert!(dir.path().join("a/b/c/one.txt").exists());
        assert!(dir.path().join("a/b/c/two.txt").exists());
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        handler
            .store("~store/docs", "report.txt", b"first")
            .await
            .unwrap();
        handler
            .store("~store/docs", "report.txt", b"second")
            .await
            .unwrap();

        let (_, data) = handler.retrieve("~store/docs/report.txt").await.unwrap();
        assert_eq!(data, b"second");
    }

    #[tokio::test]
    async fn test_retrieve_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let err = handler.retrieve("~store/docs/ghost.txt").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_retrieve_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        handler.store("~store/docs", "a.txt", b"x").await.unwrap();

        let err = handler.retrieve("~store/docs").await.unwrap_err();
        assert!(matches!(err, StoreError::IsDirectory(_)));
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        handler
            .store("~store/docs", "report.txt", b"bytes")
            .await
            .unwrap();

        handler.delete("~store/docs/report.txt").await.unwrap();
        let err = handler.delete("~store/docs/report.txt").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_path_performs_no_io() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let err = handler
            .store("/etc/cron.d", "evil.txt", b"payload")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));

        // Nothing was written anywhere under the storage root.
        let mut entries = std::fs::read_dir(dir.path()).unwrap();
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn test_store_rejects_multi_segment_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        for bad in ["../../evil.txt", "docs/nested.txt", "..", ".", ""] {
            let err = handler
                .store("~store/docs", bad, b"pwned")
                .await
                .unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidPath(_)),
                "name {:?} should be rejected",
                bad
            );
        }

        // Nothing landed inside or above the storage root.
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
        assert!(!dir.path().parent().unwrap().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_list_matching_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        handler.store("~store/mix", "b.txt", b"b").await.unwrap();
        handler.store("~store/mix", "a.txt", b"a").await.unwrap();
        handler.store("~store/mix", "prog.c", b"c").await.unwrap();
        // A name merely containing ".txt" is not a text file.
        handler
            .store("~store/mix", "archive.txt.bak", b"bak")
            .await
            .unwrap();
        std::fs::create_dir(dir.path().join("mix/subdir.txt")).unwrap();

        let txt = handler
            .list_matching("~store/mix", Some("txt"))
            .await
            .unwrap();
        assert_eq!(txt, vec!["a.txt", "b.txt"]);

        let all = handler.list_matching("~store/mix", None).await.unwrap();
        assert_eq!(all, vec!["a.txt", "archive.txt.bak", "b.txt", "prog.c"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let files = handler
            .list_matching("~store/never/created", Some("txt"))
            .await
            .unwrap();
        assert!(files.is_empty());
    }
}
