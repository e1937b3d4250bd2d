//! Low-level primitives for arena memory operations.
//!
//! [`RawBuffer`] owns the single heap block behind an arena. It is the only
//! place that calls the global allocator; every `unsafe` block here carries a
//! `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// A fixed-size, `T`-aligned byte block that is never resized or moved.
///
/// The contents are uninitialised. The block is released with the same
/// layout when the buffer is dropped.
pub(crate) struct RawBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: RawBuffer uniquely owns its heap block and hands out only raw
// addresses. Synchronising access to the bytes is the owner's job.
unsafe impl Send for RawBuffer {}
// SAFETY: `&RawBuffer` exposes nothing but the base address and length.
unsafe impl Sync for RawBuffer {}

impl RawBuffer {
    /// Allocate a buffer for `config.capacity` elements of `T`.
    pub(crate) fn for_type<T>(config: &ArenaConfig) -> Result<Self, ArenaError> {
        let bytes = config.buffer_bytes::<T>()?;
        let layout = Layout::from_size_align(bytes, std::mem::align_of::<T>()).map_err(|_| {
            ArenaError::InvalidCapacity {
                capacity: config.capacity,
                elem_size: std::mem::size_of::<T>(),
            }
        })?;
        // SAFETY: `buffer_bytes` rejects zero capacity and zero-sized `T`,
        // so the layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };
        Ok(Self { ptr, layout })
    }

    /// Address of the first byte.
    pub(crate) fn base_addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Size of the buffer in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Pointer to the byte at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the buffer.
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        assert!(
            offset <= self.len(),
            "offset {offset} out of bounds for buffer of {} bytes",
            self.len()
        );
        // SAFETY: `offset <= len`, so the result stays within (or one past
        // the end of) the allocation and cannot be null.
        unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(offset)) }
    }

    /// Byte offset of `addr` from the buffer base, if it lies inside it.
    pub(crate) fn offset_of(&self, addr: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.base_addr())?;
        (offset < self.len()).then_some(offset)
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc::alloc` with this exact layout
        // and is freed only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}
