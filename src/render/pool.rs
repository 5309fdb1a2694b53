//! Free-list index allocation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::RenderError;

/// Allocates indices out of `0..capacity`, reusing released indices before
/// growing the frontier.
///
/// Released indices come back lowest-first, so the live range stays as dense
/// as possible and buffer uploads cover a minimal prefix.
#[derive(Debug)]
pub struct IndexPool {
    capacity: u32,
    /// Next never-used index.
    frontier: u32,
    /// Released indices, min-heap.
    free: BinaryHeap<Reverse<u32>>,
}

impl IndexPool {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            frontier: 0,
            free: BinaryHeap::new(),
        }
    }

    /// Acquire an index: the smallest released one, or the frontier.
    pub fn acquire(&mut self) -> Result<u32, RenderError> {
        if let Some(Reverse(index)) = self.free.pop() {
            return Ok(index);
        }
        if self.frontier >= self.capacity {
            return Err(RenderError::PoolExhausted {
                capacity: self.capacity,
            });
        }
        let index = self.frontier;
        self.frontier += 1;
        Ok(index)
    }

    /// Return an index to the pool.
    pub fn release(&mut self, index: u32) {
        debug_assert!(index < self.frontier, "released index never acquired");
        self.free.push(Reverse(index));
    }

    /// Number of indices currently handed out.
    pub fn in_use(&self) -> usize {
        self.frontier as usize - self.free.len()
    }

    /// Indices ever touched; the dense prefix buffers must cover.
    pub fn frontier(&self) -> u32 {
        self.frontier
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_sequentially_from_zero() {
        let mut pool = IndexPool::new(4);
        assert_eq!(pool.acquire().unwrap(), 0);
        assert_eq!(pool.acquire().unwrap(), 1);
        assert_eq!(pool.acquire().unwrap(), 2);
        assert_eq!(pool.in_use(), 3);
    }

    #[test]
    fn reuses_smallest_released_first() {
        let mut pool = IndexPool::new(8);
        for _ in 0..5 {
            pool.acquire().unwrap();
        }
        pool.release(3);
        pool.release(1);
        pool.release(4);

        assert_eq!(pool.acquire().unwrap(), 1);
        assert_eq!(pool.acquire().unwrap(), 3);
        assert_eq!(pool.acquire().unwrap(), 4);
        // Free list drained, back to the frontier.
        assert_eq!(pool.acquire().unwrap(), 5);
    }

    #[test]
    fn exhaustion_is_a_distinct_error() {
        let mut pool = IndexPool::new(2);
        pool.acquire().unwrap();
        pool.acquire().unwrap();
        assert_eq!(
            pool.acquire().unwrap_err(),
            RenderError::PoolExhausted { capacity: 2 }
        );
    }

    #[test]
    fn release_makes_room_after_exhaustion() {
        let mut pool = IndexPool::new(1);
        let slot = pool.acquire().unwrap();
        assert!(pool.acquire().is_err());
        pool.release(slot);
        assert_eq!(pool.acquire().unwrap(), slot);
    }

    #[test]
    fn in_use_tracks_acquire_release() {
        let mut pool = IndexPool::new(10);
        let a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();
        assert_eq!(pool.in_use(), 2);
        pool.release(a);
        assert_eq!(pool.in_use(), 1);
    }
}
