//! The container-facing allocator contract.
//!
//! [`ContainerAllocator`] is the element-typed allocator interface that a
//! container parameterised over its storage strategy programs against:
//! count-based allocate/deallocate, in-place construct/destroy, and a
//! rebind relation to the same allocator family for another element type.
//! Byte-level container integration goes through
//! [`allocator_api2::alloc::Allocator`] instead.

#![allow(unsafe_code)]

use crate::error::ArenaError;

/// An element-typed allocator.
///
/// Construction and destruction are separate from allocation: a container
/// may drop an element long before it gives the slot back, and giving a
/// slot back never drops anything.
pub trait ContainerAllocator: Clone {
    /// The element type this allocator hands out storage for.
    type Value;
    /// Mutable pointer to an element.
    type Pointer: Copy;
    /// Read-only pointer to an element.
    type ConstPointer: Copy;
    /// Element counts.
    type Size: Copy;
    /// Distance between two element pointers.
    type Difference: Copy;
    /// The same allocator family for element type `U`.
    type Rebind<U>: ContainerAllocator<Value = U>;

    /// Reserve storage for `n` elements.
    fn allocate(&self, n: Self::Size) -> Result<Self::Pointer, ArenaError>;

    /// Reserve storage for `n` elements near `hint`. The hint may be ignored.
    fn allocate_hinted(
        &self,
        n: Self::Size,
        hint: Option<Self::ConstPointer>,
    ) -> Result<Self::Pointer, ArenaError> {
        let _ = hint;
        self.allocate(n)
    }

    /// Give back storage previously returned by `allocate`.
    ///
    /// `n` must match the original request; implementations may ignore it.
    fn deallocate(&self, p: Self::Pointer, n: Self::Size) -> Result<(), ArenaError>;

    /// Write `value` into uninitialised storage at `p`.
    ///
    /// # Safety
    ///
    /// `p` must point into live storage from this allocator that does not
    /// currently hold a value needing to be dropped.
    unsafe fn construct(&self, p: Self::Pointer, value: Self::Value);

    /// Drop the value at `p` in place without releasing its storage.
    ///
    /// # Safety
    ///
    /// `p` must point to an initialised value in storage from this
    /// allocator, and the value must not be used afterwards.
    unsafe fn destroy(&self, p: Self::Pointer);

    /// Produce an allocator of the same family for element type `U`.
    fn rebind<U>(&self) -> Result<Self::Rebind<U>, ArenaError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::HazardAllocator;
    use std::ptr::NonNull;

    /// Allocate, fill, read back and destroy through the trait alone.
    fn emplace_sum<A>(alloc: &A, values: &[u64]) -> u64
    where
        A: ContainerAllocator<Value = u64, Pointer = NonNull<u64>, Size = usize>,
    {
        let base = alloc.allocate(values.len()).unwrap();
        let mut sum = 0;
        for (i, &v) in values.iter().enumerate() {
            let p = unsafe { base.add(i) };
            unsafe { alloc.construct(p, v) };
            sum += unsafe { *p.as_ptr() };
            unsafe { alloc.destroy(p) };
        }
        alloc.deallocate(base, values.len()).unwrap();
        sum
    }

    #[test]
    fn generic_callers_use_the_unsafe_contract() {
        let alloc = HazardAllocator::<u64>::with_capacity(8).unwrap();
        assert_eq!(emplace_sum(&alloc, &[1, 2, 3, 4]), 10);
        assert_eq!(alloc.arena().live_count(), 0);
        assert_eq!(alloc.high_water_mark(), 32);
    }
}
