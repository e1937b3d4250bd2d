//! Integration test: the adapter backing real containers.
//!
//! Drives `allocator_api2` collections through `HazardAllocator` and checks
//! that every block they release stays reserved, so a stale reader keeps
//! seeing the bytes it was given.

use std::cell::Cell;
use std::rc::Rc;

use allocator_api2::boxed::Box;
use allocator_api2::vec::Vec;
use hazard_arena::{ContainerAllocator, HazardAllocator};

#[test]
fn vec_growth_retires_old_blocks() {
    let alloc = HazardAllocator::<u64>::with_capacity(64).unwrap();
    let mut v: Vec<u64, _> = Vec::new_in(alloc.clone());
    for i in 0..10 {
        v.push(i);
    }
    assert_eq!(v.iter().sum::<u64>(), 45);

    let arena = alloc.arena();
    // Every reallocation leaves its predecessor dead but still reserved.
    assert!(arena.slot_count() > 1);
    assert_eq!(arena.live_count(), 1);
    let issued: usize = arena.slots().iter().map(|(_, s)| s.len()).sum();
    assert_eq!(issued, arena.high_water_mark());

    drop(v);
    assert_eq!(arena.live_count(), 0);
    assert_eq!(arena.stats().rejected_frees, 0);
}

#[test]
fn vec_of_smaller_elements_fits_in_wider_slots() {
    let alloc = HazardAllocator::<u64>::with_capacity(8).unwrap();
    let mut v: Vec<u32, _> = Vec::with_capacity_in(3, alloc.clone());
    v.extend_from_slice(&[1, 2, 3]);
    assert_eq!(v.as_slice(), &[1, 2, 3]);
    // Three u32s round up to two u64 slots.
    assert_eq!(alloc.high_water_mark(), 16);
}

#[test]
fn exhausted_arena_refuses_reservation() {
    let alloc = HazardAllocator::<u8>::with_capacity(4).unwrap();
    let mut v: Vec<u8, _> = Vec::new_in(alloc.clone());
    assert!(v.try_reserve_exact(8).is_err());
    assert!(v.try_reserve_exact(4).is_ok());
    assert_eq!(alloc.high_water_mark(), 4);
}

#[test]
fn boxed_value_drops_once_and_releases_slot() {
    struct Tracked(Rc<Cell<u32>>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0));
    let alloc = HazardAllocator::<Tracked>::with_capacity(2).unwrap();
    let boxed = Box::new_in(Tracked(Rc::clone(&drops)), alloc.clone());
    assert_eq!(alloc.arena().live_count(), 1);
    drop(boxed);
    assert_eq!(drops.get(), 1);
    assert_eq!(alloc.arena().live_count(), 0);
    assert_eq!(alloc.arena().slot_count(), 1);
}

#[test]
fn stale_reader_sees_original_bytes_after_free() {
    let alloc = HazardAllocator::<u64>::with_capacity(4).unwrap();
    let first = alloc.allocate(1).unwrap();
    unsafe { alloc.construct(first, 0xDEAD_BEEF) };

    // A reader publishes `first` as a hazard, then the owner frees it.
    let hazard = first;
    alloc.deallocate(first, 1).unwrap();

    // The next allocation lands elsewhere; the hazard still reads the old value.
    let second = alloc.allocate(1).unwrap();
    unsafe { alloc.construct(second, 7) };
    assert_ne!(hazard, second);
    assert_eq!(unsafe { *hazard.as_ptr() }, 0xDEAD_BEEF);
    assert_eq!(alloc.arena().is_live(hazard), Some(false));
}

#[test]
fn rebound_adapter_backs_its_own_container() {
    let bytes = HazardAllocator::<u8>::with_capacity(16).unwrap();
    let words = bytes.rebind::<u32>().unwrap();
    let mut v: Vec<u32, _> = Vec::with_capacity_in(16, words.clone());
    v.extend(0..16);
    assert_eq!(words.high_water_mark(), 64);
    assert_eq!(bytes.high_water_mark(), 0);
}
