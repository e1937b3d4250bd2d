//! The fixed-capacity, append-only arena.
//!
//! [`HazardArena`] combines the three pieces of the allocation path:
//!
//! - a `RawBuffer` sized for `capacity` elements, never moved or resized;
//! - a [`BumpCursor`] that reserves disjoint byte ranges lock-free;
//! - a `SlotTable` recording each issued slot's range and liveness.
//!
//! Deallocation only clears the liveness flag. Bytes are never handed out
//! twice, so an address stays valid (and unaliased) for as long as the arena
//! exists, whatever readers still hold it.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ArenaConfig;
use crate::cursor::BumpCursor;
use crate::error::ArenaError;
use crate::policy::{NeverReclaim, ReclamationPolicy};
use crate::raw::RawBuffer;
use crate::slot::{SlotInfo, SlotTable};
use crate::stats::ArenaStats;

/// Append-only arena of `T` slots with per-slot liveness tracking.
///
/// Every address returned by [`allocate`](Self::allocate) is aligned for
/// `T`, valid for `count * size_of::<T>()` bytes and uninitialised. It stays
/// valid until the arena is dropped, even after
/// [`deallocate`](Self::deallocate). The arena never drops values stored in
/// its slots.
pub struct HazardArena<T> {
    buffer: RawBuffer,
    cursor: BumpCursor,
    slots: SlotTable,
    policy: Arc<dyn ReclamationPolicy>,
    rejected_allocations: AtomicU64,
    rejected_frees: AtomicU64,
    _marker: PhantomData<T>,
}

impl<T> HazardArena<T> {
    /// Create an arena with room for `capacity` elements.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Create an arena from a config, with the [`NeverReclaim`] policy.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::with_policy(config, NeverReclaim)
    }

    /// Create an arena that reports reclaim candidates through `policy`.
    pub fn with_policy<P>(config: ArenaConfig, policy: P) -> Result<Self, ArenaError>
    where
        P: ReclamationPolicy + 'static,
    {
        Self::with_shared_policy(config, Arc::new(policy))
    }

    pub(crate) fn with_shared_policy(
        config: ArenaConfig,
        policy: Arc<dyn ReclamationPolicy>,
    ) -> Result<Self, ArenaError> {
        let buffer = RawBuffer::for_type::<T>(&config)?;
        let cursor = BumpCursor::new(buffer.len());
        Ok(Self {
            buffer,
            cursor,
            slots: SlotTable::new(),
            policy,
            rejected_allocations: AtomicU64::new(0),
            rejected_frees: AtomicU64::new(0),
            _marker: PhantomData,
        })
    }

    /// Reserve `count` contiguous elements.
    ///
    /// The bounds check and the cursor advance use the same byte extent and
    /// happen in one atomic step, so a failed call leaves the cursor where it
    /// was.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::EmptyRequest`] if `count` is zero.
    /// - [`ArenaError::OutOfCapacity`] if the extent does not fit.
    pub fn allocate(&self, count: usize) -> Result<NonNull<T>, ArenaError> {
        let result = self.reserve(count);
        if result.is_err() {
            self.rejected_allocations.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    fn reserve(&self, count: usize) -> Result<NonNull<T>, ArenaError> {
        if count == 0 {
            return Err(ArenaError::EmptyRequest);
        }
        // A saturated extent is larger than any buffer, so it fails the
        // bounds check like any other oversized request.
        let bytes = count.saturating_mul(std::mem::size_of::<T>());
        let range = self.cursor.reserve(bytes)?;
        // Offsets are multiples of size_of::<T>() from a T-aligned base,
        // so every slot is aligned for T.
        let ptr = self.buffer.at(range.start).cast::<T>();
        self.slots.insert(ptr.as_ptr() as usize, range);
        Ok(ptr)
    }

    /// Mark the slot at `ptr` dead. Its bytes are not reclaimed.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::UnknownPointer`] if `ptr` was never returned by
    ///   [`allocate`](Self::allocate) on this arena.
    /// - [`ArenaError::DoubleFree`] if the slot is already dead.
    pub fn deallocate(&self, ptr: NonNull<T>) -> Result<(), ArenaError> {
        match self.slots.retire(ptr.as_ptr() as usize) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.rejected_frees.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    /// Liveness of the slot at `ptr`, or `None` if it was never issued.
    pub fn is_live(&self, ptr: NonNull<T>) -> Option<bool> {
        self.slot(ptr).map(|slot| slot.is_live())
    }

    /// The slot record for `ptr`, if it was issued by this arena.
    pub fn slot(&self, ptr: NonNull<T>) -> Option<SlotInfo> {
        self.slots.get(ptr.as_ptr() as usize)
    }

    /// Whether `ptr` lies inside memory this arena has issued.
    ///
    /// True for interior pointers too, not only slot starts.
    pub fn contains(&self, ptr: *const T) -> bool {
        self.buffer
            .offset_of(ptr as usize)
            .is_some_and(|offset| offset < self.cursor.high_water_mark())
    }

    /// Every issued slot, in issue order.
    pub fn slots(&self) -> Vec<(NonNull<T>, SlotInfo)> {
        self.slots
            .snapshot()
            .into_iter()
            .map(|(_, slot)| (self.buffer.at(slot.start()).cast(), slot))
            .collect()
    }

    /// Dead slots that the reclamation policy reports as unreferenced.
    ///
    /// Purely diagnostic: the arena does not reissue these slots.
    pub fn reclaim_candidates(&self) -> Vec<(NonNull<T>, SlotInfo)> {
        self.slots
            .snapshot()
            .into_iter()
            .filter(|(addr, slot)| !slot.is_live() && self.policy.may_reclaim(*addr, slot))
            .map(|(_, slot)| (self.buffer.at(slot.start()).cast(), slot))
            .collect()
    }

    pub(crate) fn policy(&self) -> &Arc<dyn ReclamationPolicy> {
        &self.policy
    }

    /// Bytes issued so far. Never decreases.
    pub fn high_water_mark(&self) -> usize {
        self.cursor.high_water_mark()
    }

    /// Capacity in elements.
    pub fn capacity(&self) -> usize {
        self.buffer.len() / std::mem::size_of::<T>()
    }

    /// Capacity in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes not yet issued.
    pub fn remaining_bytes(&self) -> usize {
        self.cursor.remaining()
    }

    /// Number of slots not yet deallocated.
    pub fn live_count(&self) -> usize {
        self.slots.counts().live
    }

    /// Number of slots ever issued.
    pub fn slot_count(&self) -> usize {
        self.slots.counts().issued
    }

    /// Current occupancy and fault counters.
    pub fn stats(&self) -> ArenaStats {
        let counts = self.slots.counts();
        ArenaStats {
            capacity_bytes: self.buffer.len(),
            high_water_mark: self.cursor.high_water_mark(),
            slots_issued: counts.issued,
            live_slots: counts.live,
            retired_bytes: counts.retired_bytes,
            rejected_allocations: self.rejected_allocations.load(Ordering::Relaxed),
            rejected_frees: self.rejected_frees.load(Ordering::Relaxed),
        }
    }
}

impl<T> fmt::Debug for HazardArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HazardArena")
            .field("capacity_bytes", &self.buffer.len())
            .field("high_water_mark", &self.cursor.high_water_mark())
            .field("slots", &self.slots.counts().issued)
            .finish_non_exhaustive()
    }
}
