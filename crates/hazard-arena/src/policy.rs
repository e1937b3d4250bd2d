//! Reclamation policy hook.
//!
//! The arena never reuses a slot. A [`ReclamationPolicy`] is the seam where a
//! hazard-pointer scan would plug in: the arena asks it which dead slots
//! *could* be recycled, and reports them through
//! [`HazardArena::reclaim_candidates`](crate::HazardArena::reclaim_candidates).
//! The allocation path does not consult the policy.

use crate::slot::SlotInfo;

/// Decides whether a dead slot is safe to recycle.
///
/// Only dead slots are ever offered. Implementations typically check the
/// address against the set of published hazard pointers.
pub trait ReclamationPolicy: Send + Sync {
    /// Whether the dead slot at `addr` is no longer referenced by any reader.
    fn may_reclaim(&self, addr: usize, slot: &SlotInfo) -> bool;
}

/// The default policy: nothing is ever reclaimable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeverReclaim;

impl ReclamationPolicy for NeverReclaim {
    fn may_reclaim(&self, _addr: usize, _slot: &SlotInfo) -> bool {
        false
    }
}

impl<F> ReclamationPolicy for F
where
    F: Fn(usize, &SlotInfo) -> bool + Send + Sync,
{
    fn may_reclaim(&self, addr: usize, slot: &SlotInfo) -> bool {
        self(addr, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_reclaim_rejects_everything() {
        let slot = SlotInfo::new(0..8);
        assert!(!NeverReclaim.may_reclaim(0x1000, &slot));
    }

    #[test]
    fn closures_are_policies() {
        let policy = |addr: usize, _slot: &SlotInfo| addr.is_multiple_of(2);
        let slot = SlotInfo::new(0..8);
        assert!(policy.may_reclaim(0x10, &slot));
        assert!(!policy.may_reclaim(0x11, &slot));
    }
}
