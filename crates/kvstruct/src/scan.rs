//! Bounded cursor walks shared by the collection scans.

use kvstruct_storage::{Cursor, KeyValue, StorageResult};

/// Collect up to `limit` entries with keys strictly greater than `start`,
/// in ascending order.
pub(crate) fn collect_after<C: Cursor>(
    cursor: &mut C,
    start: &[u8],
    limit: usize,
) -> StorageResult<Vec<KeyValue>> {
    let mut entries = Vec::new();
    if limit == 0 {
        return Ok(entries);
    }

    let mut entry = match cursor.seek(start)? {
        Some((key, _)) if key == start => cursor.next()?,
        other => other,
    };
    while let Some(kv) = entry {
        entries.push(kv);
        if entries.len() == limit {
            break;
        }
        entry = cursor.next()?;
    }
    Ok(entries)
}

/// Collect up to `limit` entries with keys strictly less than `bound`, in
/// descending order. Without a bound the walk starts at the last entry.
pub(crate) fn collect_before<C: Cursor>(
    cursor: &mut C,
    bound: Option<&[u8]>,
    limit: usize,
) -> StorageResult<Vec<KeyValue>> {
    let mut entries = Vec::new();
    if limit == 0 {
        return Ok(entries);
    }

    // Seek lands on the first key >= bound; everything before it is in range.
    let mut entry = match bound {
        Some(bound) => match cursor.seek(bound)? {
            Some(_) => cursor.prev()?,
            None => cursor.seek_last()?,
        },
        None => cursor.seek_last()?,
    };
    while let Some(kv) = entry {
        entries.push(kv);
        if entries.len() == limit {
            break;
        }
        entry = cursor.prev()?;
    }
    Ok(entries)
}
