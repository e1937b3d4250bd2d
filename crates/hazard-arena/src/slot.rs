//! Per-slot bookkeeping.
//!
//! Every successful allocation records a [`SlotInfo`] under the address it
//! returned. The record is never removed: a dead slot's bytes stay reserved
//! for the arena's lifetime, and its address is never issued again.

use std::fmt;
use std::ops::Range;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::error::ArenaError;

/// Byte range and liveness of one issued slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotInfo {
    /// Start offset within the arena buffer (inclusive).
    start: usize,
    /// End offset within the arena buffer (exclusive).
    end: usize,
    /// Cleared exactly once, when the slot is deallocated.
    live: bool,
}

impl SlotInfo {
    pub(crate) fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            live: true,
        }
    }

    /// Start offset within the arena buffer.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset within the arena buffer (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    /// The slot's `[start, end)` byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length of the slot in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether this is a zero-length slot. Never true for issued slots.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the caller still owns the slot.
    pub fn is_live(&self) -> bool {
        self.live
    }
}

impl fmt::Display for SlotInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.live { "live" } else { "dead" };
        write!(f, "Slot({}..{}, {state})", self.start, self.end)
    }
}

struct SlotState {
    /// Issued address → slot record, in issue order.
    slots: IndexMap<usize, SlotInfo>,
    live: usize,
    /// Bytes held by dead slots.
    retired_bytes: usize,
}

/// Aggregate counts over a [`SlotTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SlotCounts {
    pub(crate) issued: usize,
    pub(crate) live: usize,
    pub(crate) retired_bytes: usize,
}

/// Mutex-guarded index of every slot an arena has issued.
///
/// This lock is independent of the bump cursor: contention here never
/// blocks a reservation, only the metadata write that follows it.
pub(crate) struct SlotTable {
    state: Mutex<SlotState>,
}

impl SlotTable {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                slots: IndexMap::new(),
                live: 0,
                retired_bytes: 0,
            }),
        }
    }

    // No critical section can panic between a read and its write, so a
    // poisoned table is still consistent.
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a freshly reserved slot.
    pub(crate) fn insert(&self, addr: usize, range: Range<usize>) {
        let mut state = self.lock();
        let previous = state.slots.insert(addr, SlotInfo::new(range));
        debug_assert!(previous.is_none(), "address {addr:#x} issued twice");
        state.live += 1;
    }

    /// Mark the slot at `addr` dead and return its final record.
    pub(crate) fn retire(&self, addr: usize) -> Result<SlotInfo, ArenaError> {
        let mut state = self.lock();
        let slot = state
            .slots
            .get_mut(&addr)
            .ok_or(ArenaError::UnknownPointer { addr })?;
        if !slot.live {
            return Err(ArenaError::DoubleFree { addr });
        }
        slot.live = false;
        let retired = *slot;
        state.live -= 1;
        state.retired_bytes += retired.len();
        Ok(retired)
    }

    pub(crate) fn get(&self, addr: usize) -> Option<SlotInfo> {
        self.lock().slots.get(&addr).copied()
    }

    /// All slots in issue order.
    pub(crate) fn snapshot(&self) -> Vec<(usize, SlotInfo)> {
        self.lock()
            .slots
            .iter()
            .map(|(&addr, &slot)| (addr, slot))
            .collect()
    }

    pub(crate) fn counts(&self) -> SlotCounts {
        let state = self.lock();
        SlotCounts {
            issued: state.slots.len(),
            live: state.live,
            retired_bytes: state.retired_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_info_accessors() {
        let slot = SlotInfo::new(4..12);
        assert_eq!(slot.start(), 4);
        assert_eq!(slot.end(), 12);
        assert_eq!(slot.len(), 8);
        assert_eq!(slot.range(), 4..12);
        assert!(!slot.is_empty());
        assert!(slot.is_live());
        assert_eq!(slot.to_string(), "Slot(4..12, live)");
    }

    #[test]
    fn retire_flips_liveness_once() {
        let table = SlotTable::new();
        table.insert(0x100, 0..4);
        let retired = table.retire(0x100).unwrap();
        assert!(!retired.is_live());
        assert_eq!(retired.to_string(), "Slot(0..4, dead)");
        assert_eq!(
            table.retire(0x100),
            Err(ArenaError::DoubleFree { addr: 0x100 })
        );
        assert!(!table.get(0x100).unwrap().is_live());
    }

    #[test]
    fn retire_unknown_address_fails() {
        let table = SlotTable::new();
        table.insert(0x100, 0..4);
        assert_eq!(
            table.retire(0x104),
            Err(ArenaError::UnknownPointer { addr: 0x104 })
        );
        assert_eq!(table.counts().live, 1);
    }

    #[test]
    fn counts_track_live_and_issued() {
        let table = SlotTable::new();
        table.insert(0x10, 0..4);
        table.insert(0x14, 4..8);
        table.insert(0x18, 8..12);
        table.retire(0x14).unwrap();
        assert_eq!(
            table.counts(),
            SlotCounts {
                issued: 3,
                live: 2,
                retired_bytes: 4,
            }
        );
    }

    #[test]
    fn snapshot_preserves_issue_order() {
        let table = SlotTable::new();
        table.insert(0x30, 8..12);
        table.insert(0x10, 0..4);
        let addrs: Vec<usize> = table.snapshot().iter().map(|(a, _)| *a).collect();
        assert_eq!(addrs, vec![0x30, 0x10]);
    }
}
