//! Point-in-time arena metrics.

/// Occupancy and fault counters for one arena.
///
/// Produced by [`HazardArena::stats`](crate::HazardArena::stats). Byte
/// counts are exact at the moment each was read; under concurrent use the
/// fields may come from slightly different instants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Size of the backing buffer in bytes.
    pub capacity_bytes: usize,
    /// Bytes issued so far (the cursor).
    pub high_water_mark: usize,
    /// Number of slots ever issued.
    pub slots_issued: usize,
    /// Number of slots not yet deallocated.
    pub live_slots: usize,
    /// Bytes held by deallocated slots. These are never reissued.
    pub retired_bytes: usize,
    /// Cumulative number of failed `allocate` calls.
    pub rejected_allocations: u64,
    /// Cumulative number of failed `deallocate` calls.
    pub rejected_frees: u64,
}

impl ArenaStats {
    /// Number of deallocated slots.
    pub fn retired_slots(&self) -> usize {
        self.slots_issued - self.live_slots
    }

    /// Fraction of the buffer that has been issued, in `[0.0, 1.0]`.
    pub fn utilisation(&self) -> f64 {
        if self.capacity_bytes == 0 {
            return 0.0;
        }
        self.high_water_mark as f64 / self.capacity_bytes as f64
    }
}
