//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Every variant is a programmer-error-class fault reported at the point of
/// the offending call. None of them leave the arena partially mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The requested extent does not fit in the remaining buffer.
    OutOfCapacity {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes already issued when the request was rejected.
        used: usize,
        /// Total size of the buffer in bytes.
        capacity: usize,
    },
    /// `deallocate` was called with an address this arena never issued.
    UnknownPointer {
        /// The unrecognised address.
        addr: usize,
    },
    /// `deallocate` was called on a slot that is already dead.
    DoubleFree {
        /// The address of the dead slot.
        addr: usize,
    },
    /// The configured element capacity cannot back a buffer: it is zero, or
    /// `capacity * elem_size` overflows or exceeds `isize::MAX`.
    InvalidCapacity {
        /// Requested capacity in elements.
        capacity: usize,
        /// Size of one element in bytes.
        elem_size: usize,
    },
    /// The element type has size zero, so every slot would share one address.
    ZeroSizedType,
    /// `allocate` was called with a count of zero.
    EmptyRequest,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfCapacity {
                requested,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "arena out of capacity: requested {requested} bytes, {used} of {capacity} bytes in use"
                )
            }
            Self::UnknownPointer { addr } => {
                write!(f, "unknown pointer {addr:#x}: not issued by this arena")
            }
            Self::DoubleFree { addr } => {
                write!(f, "double free of pointer {addr:#x}")
            }
            Self::InvalidCapacity {
                capacity,
                elem_size,
            } => {
                write!(
                    f,
                    "invalid arena capacity: {capacity} elements of {elem_size} bytes"
                )
            }
            Self::ZeroSizedType => write!(f, "arena element type must not be zero-sized"),
            Self::EmptyRequest => write!(f, "allocation request of zero elements"),
        }
    }
}

impl Error for ArenaError {}
