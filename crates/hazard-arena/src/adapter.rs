//! Allocator adapter over a shared [`HazardArena`].
//!
//! [`HazardAllocator`] holds its arena through an `Arc`, so an adapter can
//! never outlive the memory it hands out. Clones share the arena and compare
//! equal; [`rebind`](ContainerAllocator::rebind) creates an independent arena
//! for the new element type with the same element capacity and reclamation
//! policy.
//!
//! Two integration surfaces are provided:
//!
//! - [`ContainerAllocator`]: element-typed allocate/deallocate,
//!   construct/destroy and rebind.
//! - [`allocator_api2::alloc::Allocator`]: byte-level, so the arena can back
//!   `allocator_api2::vec::Vec` and `allocator_api2::boxed::Box`.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::ptr::{self, NonNull};
use std::sync::Arc;

use allocator_api2::alloc::{AllocError, Allocator};

use crate::arena::HazardArena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::traits::ContainerAllocator;

/// Container-facing handle to one [`HazardArena`].
pub struct HazardAllocator<T> {
    arena: Arc<HazardArena<T>>,
}

// Compile-time assertion: adapters over Send + Sync elements can be shared.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<HazardAllocator<u64>>();
};

impl<T> HazardAllocator<T> {
    /// Create an adapter over a fresh arena of
    /// [`ArenaConfig::DEFAULT_ADAPTER_CAPACITY`] elements.
    pub fn new() -> Result<Self, ArenaError> {
        Self::with_capacity(ArenaConfig::DEFAULT_ADAPTER_CAPACITY)
    }

    /// Create an adapter over a fresh arena of `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        Ok(Self::from_arena(Arc::new(HazardArena::new(capacity)?)))
    }

    /// Wrap an existing shared arena.
    pub fn from_arena(arena: Arc<HazardArena<T>>) -> Self {
        Self { arena }
    }

    /// The arena behind this adapter.
    pub fn arena(&self) -> &Arc<HazardArena<T>> {
        &self.arena
    }

    /// Bytes issued by the underlying arena so far.
    pub fn high_water_mark(&self) -> usize {
        self.arena.high_water_mark()
    }
}

impl<T> Clone for HazardAllocator<T> {
    fn clone(&self) -> Self {
        Self {
            arena: Arc::clone(&self.arena),
        }
    }
}

/// Adapters are equal when memory from one can be returned through the other.
impl<T> PartialEq for HazardAllocator<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena)
    }
}

impl<T> Eq for HazardAllocator<T> {}

impl<T> fmt::Debug for HazardAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HazardAllocator")
            .field("arena", &*self.arena)
            .finish()
    }
}

impl<T> ContainerAllocator for HazardAllocator<T> {
    type Value = T;
    type Pointer = NonNull<T>;
    type ConstPointer = *const T;
    type Size = usize;
    type Difference = isize;
    type Rebind<U> = HazardAllocator<U>;

    fn allocate(&self, n: usize) -> Result<NonNull<T>, ArenaError> {
        self.arena.allocate(n)
    }

    fn deallocate(&self, p: NonNull<T>, _n: usize) -> Result<(), ArenaError> {
        // The slot table already knows the extent.
        self.arena.deallocate(p)
    }

    unsafe fn construct(&self, p: NonNull<T>, value: T) {
        debug_assert!(self.arena.contains(p.as_ptr()), "construct outside arena");
        // SAFETY: the caller guarantees `p` is live, aligned storage from
        // this arena holding no value that needs dropping.
        unsafe { p.as_ptr().write(value) };
    }

    unsafe fn destroy(&self, p: NonNull<T>) {
        debug_assert!(self.arena.contains(p.as_ptr()), "destroy outside arena");
        // SAFETY: the caller guarantees `p` holds an initialised value that
        // is not used again.
        unsafe { ptr::drop_in_place(p.as_ptr()) };
    }

    fn rebind<U>(&self) -> Result<HazardAllocator<U>, ArenaError> {
        let config = ArenaConfig::new(self.arena.capacity());
        let arena = HazardArena::with_shared_policy(config, Arc::clone(self.arena.policy()))?;
        Ok(HazardAllocator::from_arena(Arc::new(arena)))
    }
}

// SAFETY: blocks are carved from a buffer owned by the shared arena and are
// never reissued, so they stay valid while any clone of this adapter (and
// therefore the arena) is alive. Clones share one arena, so a block can be
// deallocated through any of them.
//
// `deallocate` panics on a pointer the arena rejects (unknown or already
// freed).
unsafe impl<T> Allocator for HazardAllocator<T> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.align() > std::mem::align_of::<T>() {
            return Err(AllocError);
        }
        if layout.size() == 0 {
            let dangling = NonNull::new(ptr::without_provenance_mut::<u8>(layout.align()))
                .ok_or(AllocError)?;
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }
        let elem_size = std::mem::size_of::<T>();
        let count = layout.size().div_ceil(elem_size);
        let ptr = self.arena.allocate(count).map_err(|_| AllocError)?;
        Ok(NonNull::slice_from_raw_parts(
            ptr.cast::<u8>(),
            count * elem_size,
        ))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        if let Err(err) = self.arena.deallocate(ptr.cast::<T>()) {
            panic!("hazard allocator rejected free: {err}");
        }
    }
}
