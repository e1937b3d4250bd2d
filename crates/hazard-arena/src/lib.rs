//! Fixed-capacity, append-only arena for hazard-pointer style reclamation.
//!
//! Objects placed in a [`HazardArena`] keep a stable address for the whole
//! life of the arena. Deallocation only flips a liveness flag; the bytes are
//! never reissued, so a reader still holding an old pointer never sees it
//! alias a newer object. Deciding *when* a dead slot could be recycled is
//! left to a [`ReclamationPolicy`], which this crate consults only for
//! reporting.
//!
//! # Architecture
//!
//! ```text
//! HazardAllocator<T> (container-facing adapter)
//! └── Arc<HazardArena<T>>
//!     ├── RawBuffer     (capacity * size_of::<T>() bytes, never resized)
//!     ├── BumpCursor    (lock-free high-water mark, CAS reservation)
//!     ├── SlotTable     (Mutex<IndexMap<addr, SlotInfo>>, issue order)
//!     └── Arc<dyn ReclamationPolicy> (NeverReclaim by default)
//! ```
//!
//! The cursor and the slot table are separate synchronisation domains:
//! reservations never wait on the metadata lock.
//!
//! # Example
//!
//! ```
//! use hazard_arena::{ArenaError, HazardArena};
//!
//! let arena = HazardArena::<i32>::new(4).unwrap();
//! let a = arena.allocate(1).unwrap();
//! arena.allocate(2).unwrap();
//! arena.allocate(1).unwrap();
//! assert_eq!(arena.high_water_mark(), 16);
//! assert!(matches!(arena.allocate(1), Err(ArenaError::OutOfCapacity { .. })));
//!
//! arena.deallocate(a).unwrap();
//! assert_eq!(arena.is_live(a), Some(false));
//! assert_eq!(arena.high_water_mark(), 16);
//! ```
//!
//! # Safety
//!
//! `unsafe` is confined to `raw.rs` (buffer allocation), `traits.rs` (the
//! `unsafe` construct/destroy contract) and `adapter.rs` (its implementation
//! and the `Allocator` impl).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod adapter;
pub mod arena;
pub mod config;
pub mod cursor;
pub mod error;
pub mod policy;
mod raw;
pub mod slot;
pub mod stats;
pub mod traits;

// Public re-exports for the primary API surface.
pub use adapter::HazardAllocator;
pub use arena::HazardArena;
pub use config::ArenaConfig;
pub use cursor::BumpCursor;
pub use error::ArenaError;
pub use policy::{NeverReclaim, ReclamationPolicy};
pub use slot::SlotInfo;
pub use stats::ArenaStats;
pub use traits::ContainerAllocator;
