//! Lock-free bump cursor over a fixed byte extent.
//!
//! A [`BumpCursor`] only ever moves forward. A reservation either claims the
//! whole requested extent in one atomic step or fails without moving the
//! cursor at all.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ArenaError;

/// Atomic high-water mark of issued bytes.
///
/// Concurrent callers always receive disjoint ranges: the bounds check and
/// the advance are the same compare-and-swap, so no two threads can observe
/// the same starting offset.
pub struct BumpCursor {
    /// Next free byte offset.
    offset: AtomicUsize,
    /// Total size of the extent in bytes.
    limit: usize,
}

// Compile-time assertion: BumpCursor must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<BumpCursor>();
};

impl BumpCursor {
    /// Create a cursor at offset zero over `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            offset: AtomicUsize::new(0),
            limit,
        }
    }

    /// Reserve `bytes` bytes and return the claimed `[start, end)` range.
    ///
    /// Returns `Err(ArenaError::OutOfCapacity)` if the reservation would
    /// pass the limit. The cursor is left untouched on failure.
    pub fn reserve(&self, bytes: usize) -> Result<Range<usize>, ArenaError> {
        // Relaxed is enough: the RMW alone keeps ranges disjoint, and slot
        // metadata is published through the slot table's mutex.
        let start = self
            .offset
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(bytes).filter(|&end| end <= self.limit)
            })
            .map_err(|used| ArenaError::OutOfCapacity {
                requested: bytes,
                used,
                capacity: self.limit,
            })?;
        Ok(start..start + bytes)
    }

    /// Bytes issued so far.
    pub fn high_water_mark(&self) -> usize {
        self.offset.load(Ordering::Relaxed)
    }

    /// Total size of the extent in bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes still available for reservation.
    pub fn remaining(&self) -> usize {
        self.limit - self.high_water_mark()
    }
}
