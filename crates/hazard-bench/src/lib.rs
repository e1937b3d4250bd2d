//! Workload generators for benchmarking `hazard-arena`.
//!
//! - [`request_counts`]: deterministic allocation sizes via seed
//! - [`replay`]: single-threaded allocate/free churn over one arena
//! - [`concurrent_fill`]: many threads bump-allocating from one arena

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::panic;
use std::thread;

use hazard_arena::HazardArena;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `n` allocation counts in `1..=max_count`, reproducible per seed.
///
/// # Panics
///
/// Panics if `max_count` is zero.
pub fn request_counts(n: usize, max_count: usize, seed: u64) -> Vec<usize> {
    assert!(max_count > 0, "max_count must be >= 1");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.next_u64() % max_count as u64) as usize + 1)
        .collect()
}

/// Total element capacity needed to satisfy every request in `counts`.
pub fn required_capacity(counts: &[usize]) -> usize {
    counts.iter().sum()
}

/// Allocate each count in order, freeing every `free_every`-th slot.
///
/// Stops at the first failed allocation. Returns the number of successful
/// allocations.
pub fn replay<T>(arena: &HazardArena<T>, counts: &[usize], free_every: usize) -> usize {
    let mut issued = 0usize;
    for &count in counts {
        let Ok(ptr) = arena.allocate(count) else {
            break;
        };
        issued += 1;
        if free_every > 0 && issued.is_multiple_of(free_every) {
            let freed = arena.deallocate(ptr);
            debug_assert!(freed.is_ok(), "fresh slot rejected: {freed:?}");
        }
    }
    issued
}

/// Run `threads` workers, each performing `per_thread` single-element
/// allocations on `arena`. Returns the number of successful allocations.
pub fn concurrent_fill<T: Sync>(
    arena: &HazardArena<T>,
    threads: usize,
    per_thread: usize,
) -> usize {
    run_workers(threads, || {
        (0..per_thread)
            .filter(|_| arena.allocate(1).is_ok())
            .count()
    })
}

/// Run `work` on `threads` scoped threads and sum the results.
///
/// A worker panic is re-raised on the calling thread.
fn run_workers<F>(threads: usize, work: F) -> usize
where
    F: Fn() -> usize + Sync,
{
    let work = &work;
    thread::scope(|s| {
        let workers: Vec<_> = (0..threads).map(|_| s.spawn(work)).collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_counts_deterministic_and_bounded() {
        let a = request_counts(100, 8, 42);
        let b = request_counts(100, 8, 42);
        assert_eq!(a, b);
        assert!(a.iter().all(|&c| (1..=8).contains(&c)));
        assert_ne!(a, request_counts(100, 8, 43));
    }

    #[test]
    fn replay_fits_in_required_capacity() {
        let counts = request_counts(50, 4, 7);
        let arena = HazardArena::<u64>::new(required_capacity(&counts)).unwrap();
        assert_eq!(replay(&arena, &counts, 2), counts.len());
        assert_eq!(arena.remaining_bytes(), 0);
        assert_eq!(arena.live_count(), counts.len() - counts.len() / 2);
    }

    #[test]
    fn replay_stops_at_capacity() {
        let arena = HazardArena::<u32>::new(5).unwrap();
        assert_eq!(replay(&arena, &[2, 2, 2, 1], 0), 2);
    }

    #[test]
    fn replay_freeing_every_slot_leaves_none_live() {
        let counts = request_counts(20, 3, 11);
        let arena = HazardArena::<u16>::new(required_capacity(&counts)).unwrap();
        assert_eq!(replay(&arena, &counts, 1), counts.len());
        assert_eq!(arena.live_count(), 0);
        assert_eq!(arena.stats().rejected_frees, 0);
    }

    #[test]
    #[should_panic(expected = "worker failed")]
    fn worker_panics_reach_the_caller() {
        run_workers(3, || panic!("worker failed"));
    }

    #[test]
    fn run_workers_sums_every_worker() {
        assert_eq!(run_workers(5, || 7), 35);
    }

    #[test]
    fn concurrent_fill_counts_successes() {
        let arena = HazardArena::<u64>::new(100).unwrap();
        assert_eq!(concurrent_fill(&arena, 4, 50), 100);
        assert_eq!(arena.stats().rejected_allocations, 100);
    }
}
