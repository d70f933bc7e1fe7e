//! Integration tests for the database handle and transaction lifecycle.

use std::sync::Arc;

use kvstruct::{
    Config, Database, DatabaseBuilder, Error, HashBucket, SortedIndex, Transaction, TransactionExt,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Opening
// ============================================================================

#[test]
fn test_persistence_across_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("data.kvstruct");

    {
        let db = Database::open(&path).expect("failed to open database");
        db.update(|tx| {
            tx.hash().set("profiles", b"alice", b"level=3")?;
            tx.sorted().set("leaderboard", b"alice", 120)?;
            tx.sorted().set("leaderboard", b"bob", 80)?;
            tx.sorted().next_sequence("leaderboard")?;
            Ok(())
        })
        .expect("update failed");
        db.close().expect("failed to close database");
    }

    {
        let db = DatabaseBuilder::new()
            .path(&path)
            .create_if_missing(false)
            .cache_size(1024 * 1024)
            .open()
            .expect("failed to reopen database");
        assert_eq!(db.config().cache_size, Some(1024 * 1024));

        db.view(|tx| {
            assert_eq!(tx.hash().get("profiles", b"alice")?, b"level=3".to_vec());
            let top = tx.sorted().scan_backward("leaderboard", b"", None, 1)?;
            assert_eq!(top, vec![(b"alice".to_vec(), 120)]);
            assert_eq!(tx.sorted().sequence("leaderboard")?, 1);
            Ok(())
        })
        .expect("view failed");
    }
}

#[test]
fn test_open_missing_without_create() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = Config::new(dir.path().join("absent.kvstruct")).create_if_missing(false);

    let result = Database::open_with_config(config);
    assert!(matches!(result, Err(Error::Open(_))));
}

#[test]
fn test_builder_requires_path() {
    let result = DatabaseBuilder::new().open();
    assert!(matches!(result, Err(Error::Config(_))));

    let builder = Database::builder().path("unused").cache_size(4096);
    assert_eq!(builder.config().cache_size, Some(4096));
    assert!(matches!(
        Database::builder().path("unused").cache_size(0).open(),
        Err(Error::Config(_))
    ));

    let db = DatabaseBuilder::in_memory().open().expect("failed to open in-memory database");
    assert!(db.config().in_memory);
}

// ============================================================================
// Transactions
// ============================================================================

#[test]
fn test_manual_transactions() {
    let db = Database::in_memory().expect("failed to open database");

    let mut tx = db.begin_write().expect("failed to begin write");
    assert!(!tx.is_read_only());
    HashBucket::new(&mut tx).set("h", b"k", b"v").expect("failed to set");
    SortedIndex::new(&mut tx).set("s", b"k", 9).expect("failed to set");
    tx.commit().expect("failed to commit");

    let mut tx = db.begin_read().expect("failed to begin read");
    assert!(tx.is_read_only());
    assert_eq!(HashBucket::new(&mut tx).get("h", b"k").expect("failed to get"), b"v".to_vec());
    assert_eq!(SortedIndex::new(&mut tx).get("s", b"k").expect("failed to get"), 9);
}

#[test]
fn test_dropped_write_is_discarded() {
    let db = Database::in_memory().expect("failed to open database");

    {
        let mut tx = db.begin_write().expect("failed to begin write");
        tx.sorted().set("s", b"k", 1).expect("failed to set");
        // Dropped without commit.
    }

    let err = db.view(|tx| tx.sorted().get("s", b"k")).unwrap_err();
    assert!(matches!(err, Error::BucketNotFound(_)));
}

#[test]
fn test_failed_update_rolls_back_everything() {
    init_tracing();
    let db = Database::in_memory().expect("failed to open database");

    let result: kvstruct::Result<()> = db.update(|tx| {
        tx.hash().set("h", b"k", b"v")?;
        tx.sorted().set("s", b"k", u64::MAX)?;
        tx.sorted().increment("s", b"k", 1)?;
        Ok(())
    });
    assert!(matches!(result, Err(Error::Overflow { .. })));

    db.view(|tx| {
        assert!(!tx.hash().exists("h")?);
        assert_eq!(tx.sorted().len("s")?, 0);
        Ok(())
    })
    .expect("view failed");
}

#[test]
fn test_view_rejects_writes() {
    let db = Database::in_memory().expect("failed to open database");

    let err = db.view(|tx| tx.sorted().set("s", b"k", 1)).unwrap_err();
    assert!(err.is_storage_error());

    let err = db.view(|tx| tx.hash().next_sequence("h")).unwrap_err();
    assert!(err.is_storage_error());
}

#[test]
fn test_concurrent_readers() {
    let db = Arc::new(Database::in_memory().expect("failed to open database"));

    db.update(|tx| {
        let mut sorted = tx.sorted();
        for i in 0..100u64 {
            sorted.set("s", format!("member:{i:03}").as_bytes(), i * 10)?;
        }
        Ok(())
    })
    .expect("update failed");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let db = Arc::clone(&db);
            scope.spawn(move || {
                let members =
                    db.view(|tx| tx.sorted().scan_forward("s", 1000)).expect("scan failed");
                assert_eq!(members.len(), 100);
                assert!(members.windows(2).all(|w| w[0].1 <= w[1].1));
            });
        }
    });
}
