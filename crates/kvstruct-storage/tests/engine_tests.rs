//! Backend-independent checks of the bucket store contract.
//!
//! Each backend supplies a [`TestHarness`] and calls [`run_test_suite`].

#![allow(dead_code)]

use kvstruct_storage::{Cursor, StorageEngine, StorageError, StorageResult, Transaction};

/// How a backend under test is created and torn down.
pub trait TestHarness {
    /// The backend.
    type Engine: StorageEngine;

    /// A fresh, empty store.
    fn create_engine() -> StorageResult<Self::Engine>;

    /// Release anything the store left behind.
    fn cleanup(_engine: Self::Engine) {}
}

/// Every contract check, in order, each on its own fresh store.
pub fn run_test_suite<H: TestHarness>() {
    test_bucket_lifecycle::<H>();
    test_basic_operations::<H>();
    test_missing_bucket_errors::<H>();
    test_transaction_isolation::<H>();
    test_rollback::<H>();
    test_cursor_operations::<H>();
    test_sequences::<H>();
    test_read_only_enforcement::<H>();
}

/// Buckets are created once, deleted with their contents and recreated empty.
fn test_bucket_lifecycle<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        assert!(!tx.bucket_exists(b"b1").expect("failed to check bucket"));
        tx.create_bucket(b"b1").expect("failed to create bucket");
        assert!(tx.bucket_exists(b"b1").expect("failed to check bucket"));

        let err = tx.create_bucket(b"b1").expect_err("duplicate bucket should fail");
        assert!(matches!(err, StorageError::BucketExists(_)));
        assert!(!tx.create_bucket_if_not_exists(b"b1").expect("failed to create bucket"));
        assert!(tx.create_bucket_if_not_exists(b"b2").expect("failed to create bucket"));

        tx.put(b"b1", b"k", b"v").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.delete_bucket(b"b1").expect("failed to delete bucket");
        assert!(!tx.bucket_exists(b"b1").expect("failed to check bucket"));

        // Recreating the bucket yields an empty one.
        tx.create_bucket(b"b1").expect("failed to recreate bucket");
        assert_eq!(tx.get(b"b1", b"k").expect("failed to get"), None);

        let err = tx.delete_bucket(b"missing").expect_err("missing bucket should fail");
        assert!(err.is_bucket_not_found());
        tx.commit().expect("failed to commit");
    }

    H::cleanup(engine);
}

/// Point writes are visible after commit and can be overwritten and removed.
fn test_basic_operations<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.create_bucket(b"accounts").expect("failed to create bucket");
        tx.put(b"accounts", b"alice", b"balance=10").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let value = tx.get(b"accounts", b"alice").expect("failed to get");
        assert_eq!(value, Some(b"balance=10".to_vec()));
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put(b"accounts", b"alice", b"balance=25").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let value = tx.get(b"accounts", b"alice").expect("failed to get");
        assert_eq!(value, Some(b"balance=25".to_vec()));
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        assert!(tx.delete(b"accounts", b"alice").expect("failed to delete"));
        assert!(!tx.delete(b"accounts", b"mallory").expect("failed to delete"));
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let value = tx.get(b"accounts", b"alice").expect("failed to get");
        assert_eq!(value, None);
    }

    H::cleanup(engine);
}

/// Point operations on a missing bucket name it in the error.
fn test_missing_bucket_errors<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    let mut tx = engine.begin_write().expect("failed to begin write");
    assert!(tx.get(b"nope", b"k").expect_err("get").is_bucket_not_found());
    assert!(tx.put(b"nope", b"k", b"v").expect_err("put").is_bucket_not_found());
    assert!(tx.delete(b"nope", b"k").expect_err("delete").is_bucket_not_found());
    assert!(tx.sequence(b"nope").expect_err("sequence").is_bucket_not_found());
    assert!(tx.cursor(b"nope").err().is_some_and(|e| e.is_bucket_not_found()));
    tx.rollback().expect("failed to rollback");

    // A read transaction on a fresh database sees no buckets at all.
    {
        let tx = engine.begin_read().expect("failed to begin read");
        assert!(!tx.bucket_exists(b"nope").expect("failed to check bucket"));
        assert!(tx.get(b"nope", b"k").expect_err("get").is_bucket_not_found());
    }

    H::cleanup(engine);
}

/// Readers see the state committed before they started.
fn test_transaction_isolation<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.create_bucket(b"accounts").expect("failed to create bucket");
        tx.put(b"accounts", b"alice", b"active").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let read_tx = engine.begin_read().expect("failed to begin read");
        let value = read_tx.get(b"accounts", b"alice").expect("failed to get");
        assert_eq!(value, Some(b"active".to_vec()));
    }

    {
        let mut write_tx = engine.begin_write().expect("failed to begin write");
        write_tx.put(b"accounts", b"alice", b"suspended").expect("failed to put");
        write_tx.commit().expect("failed to commit");
    }

    {
        let read_tx = engine.begin_read().expect("failed to begin read");
        let value = read_tx.get(b"accounts", b"alice").expect("failed to get");
        assert_eq!(value, Some(b"suspended".to_vec()));
    }

    H::cleanup(engine);
}

/// Rollback discards changes to several buckets at once.
fn test_rollback<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.create_bucket(b"a").expect("failed to create bucket");
        tx.put(b"a", b"key", b"initial").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put(b"a", b"key", b"modified").expect("failed to put");
        tx.create_bucket(b"b").expect("failed to create bucket");
        tx.put(b"b", b"key", b"new").expect("failed to put");
        tx.next_sequence(b"a").expect("failed to advance sequence");
        tx.rollback().expect("failed to rollback");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        assert_eq!(tx.get(b"a", b"key").expect("failed to get"), Some(b"initial".to_vec()));
        assert!(!tx.bucket_exists(b"b").expect("failed to check bucket"));
        assert_eq!(tx.sequence(b"a").expect("failed to read sequence"), 0);
    }

    H::cleanup(engine);
}

/// Cursor positioning and movement stay inside one bucket.
fn test_cursor_operations<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");
    let entry = |k: &str, v: &str| Some((k.as_bytes().to_vec(), v.as_bytes().to_vec()));

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.create_bucket(b"days").expect("failed to create bucket");
        tx.create_bucket(b"days2").expect("failed to create bucket");
        let week = [("d1", "mon"), ("d2", "tue"), ("d3", "wed"), ("d4", "thu"), ("d5", "fri")];
        for (day, name) in week {
            tx.put(b"days", day.as_bytes(), name.as_bytes()).expect("failed to put");
        }
        // "days2" sorts right after "days" in the physical table.
        tx.put(b"days2", b"d0", b"sun").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let mut cursor = tx.cursor(b"days").expect("failed to create cursor");

        assert_eq!(cursor.seek_first().expect("seek_first"), entry("d1", "mon"));
        assert_eq!(cursor.next().expect("next"), entry("d2", "tue"));
        assert_eq!(cursor.current(), Some((&b"d2"[..], &b"tue"[..])));
        assert_eq!(cursor.seek(b"d3").expect("seek"), entry("d3", "wed"));
        assert_eq!(cursor.seek_last().expect("seek_last"), entry("d5", "fri"));
        assert_eq!(cursor.prev().expect("prev"), entry("d4", "thu"));

        cursor.seek_last().expect("seek_last");
        assert_eq!(cursor.next().expect("next"), None);
        assert_eq!(cursor.current(), None);

        cursor.seek_first().expect("seek_first");
        assert_eq!(cursor.prev().expect("prev"), None);
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let mut cursor = tx.cursor(b"days").expect("failed to create cursor");

        // Seeking between keys lands on the next one; past the end is None.
        assert_eq!(cursor.seek(b"d25").expect("seek"), entry("d3", "wed"));
        assert_eq!(cursor.seek(b"d6").expect("seek"), None);

        let mut cursor = tx.cursor(b"days2").expect("failed to create cursor");
        assert_eq!(cursor.seek_first().expect("seek_first"), entry("d0", "sun"));
        assert_eq!(cursor.next().expect("next"), None);
    }

    H::cleanup(engine);
}

/// Each bucket owns its own counter, which stops at `u64::MAX`.
fn test_sequences<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.create_bucket(b"seq").expect("failed to create bucket");
        tx.create_bucket(b"other").expect("failed to create bucket");
        assert_eq!(tx.sequence(b"seq").expect("failed to read sequence"), 0);
        assert_eq!(tx.next_sequence(b"seq").expect("failed to advance"), 1);
        assert_eq!(tx.next_sequence(b"seq").expect("failed to advance"), 2);
        tx.set_sequence(b"seq", 100).expect("failed to set sequence");
        assert_eq!(tx.next_sequence(b"seq").expect("failed to advance"), 101);
        assert_eq!(tx.sequence(b"other").expect("failed to read sequence"), 0);

        tx.set_sequence(b"other", u64::MAX).expect("failed to set sequence");
        let err = tx.next_sequence(b"other").expect_err("counter should be exhausted");
        assert!(matches!(err, StorageError::SequenceOverflow(_)));
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        assert_eq!(tx.sequence(b"seq").expect("failed to read sequence"), 101);
    }

    H::cleanup(engine);
}

/// Snapshot reads refuse every mutation.
fn test_read_only_enforcement<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.create_bucket(b"ro").expect("failed to create bucket");
        tx.commit().expect("failed to commit");
    }

    {
        let mut tx = engine.begin_read().expect("failed to begin read");
        assert!(tx.is_read_only());
        assert!(matches!(tx.put(b"ro", b"k", b"v"), Err(StorageError::ReadOnly)));
        assert!(matches!(tx.delete(b"ro", b"k"), Err(StorageError::ReadOnly)));
        assert!(matches!(tx.create_bucket(b"new"), Err(StorageError::ReadOnly)));
        assert!(matches!(tx.delete_bucket(b"ro"), Err(StorageError::ReadOnly)));
        assert!(matches!(tx.next_sequence(b"ro"), Err(StorageError::ReadOnly)));
    }

    {
        let tx = engine.begin_write().expect("failed to begin write");
        assert!(!tx.is_read_only());
        tx.rollback().expect("failed to rollback");
    }

    H::cleanup(engine);
}

/// Storage errors render the bucket name readably.
#[test]
fn test_error_types() {
    fn assert_error<E: std::error::Error>() {}
    assert_error::<StorageError>();

    let open_err = StorageError::Open("test".to_string());
    assert!(open_err.to_string().contains("test"));
    assert!(!open_err.is_bucket_not_found());

    let not_found = StorageError::BucketNotFound(b"\x1dusers".to_vec());
    assert!(not_found.is_bucket_not_found());
    assert_eq!(not_found.to_string(), "bucket not found: \\x1dusers");

    let read_only_err = StorageError::ReadOnly;
    assert!(read_only_err.to_string().contains("read-only"));
}

/// Every storage error is one the backend can actually report.
#[test]
fn test_error_variants_are_all_reachable() {
    fn source(err: &StorageError) -> &'static str {
        match err {
            StorageError::Open(_) => "open",
            StorageError::BucketNotFound(_)
            | StorageError::BucketExists(_)
            | StorageError::SequenceOverflow(_) => "bucket",
            StorageError::ReadOnly => "read-only transaction",
            StorageError::Transaction(_) | StorageError::Internal(_) => "backend",
        }
    }

    assert_eq!(source(&StorageError::Open("locked".into())), "open");
    assert_eq!(source(&StorageError::SequenceOverflow(b"ids".to_vec())), "bucket");
    assert_eq!(source(&StorageError::Internal("corrupt page".into())), "backend");
}

/// `Cursor` can be used as a trait object.
#[test]
fn test_cursor_object_safety() {
    fn _takes_cursor(_: &dyn Cursor) {}
}
