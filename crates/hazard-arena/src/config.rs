//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for a [`HazardArena`](crate::HazardArena).
///
/// The capacity is counted in elements of the arena's type. Validated at
/// construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of `T` elements the buffer can hold.
    ///
    /// Default: 4096. Must be non-zero, and `capacity * size_of::<T>()`
    /// must not exceed `isize::MAX`.
    pub capacity: usize,
}

impl ArenaConfig {
    /// Default capacity for a standalone arena.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Default capacity for the arena behind an allocator adapter.
    pub const DEFAULT_ADAPTER_CAPACITY: usize = 1024;

    /// Create a config for the given element capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Buffer size in bytes for elements of type `T`.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::ZeroSizedType`] if `T` is zero-sized.
    /// - [`ArenaError::InvalidCapacity`] if the capacity is zero, or the
    ///   byte size overflows or exceeds `isize::MAX`.
    pub fn buffer_bytes<T>(&self) -> Result<usize, ArenaError> {
        let elem_size = std::mem::size_of::<T>();
        if elem_size == 0 {
            return Err(ArenaError::ZeroSizedType);
        }
        let invalid = ArenaError::InvalidCapacity {
            capacity: self.capacity,
            elem_size,
        };
        if self.capacity == 0 {
            return Err(invalid);
        }
        match self.capacity.checked_mul(elem_size) {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(bytes),
            _ => Err(invalid),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
