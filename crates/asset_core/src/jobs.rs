//! Fork-join job pool for the loader's CPU-heavy phases.
//!
//! Dispatch-and-join per tick: the caller hands over a mutable slice, the
//! pool splits it into fixed partitions and runs them on scoped threads, and
//! the call returns only when every partition is done. The simulation thread
//! therefore never observes a partially-processed batch.

pub struct JobPool {
    workers: usize,
}

impl JobPool {
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `each` over every item, partitioned across the pool. Items must
    /// be independent; shared state inside `each` needs its own locks.
    pub fn run_partitioned<T, F>(&self, items: &mut [T], each: F)
    where
        T: Send,
        F: Fn(&mut T) + Sync,
    {
        if items.is_empty() {
            return;
        }
        if self.workers == 1 || items.len() == 1 {
            for it in items {
                each(it);
            }
            return;
        }
        let chunk = items.len().div_ceil(self.workers);
        std::thread::scope(|s| {
            for part in items.chunks_mut(chunk) {
                s.spawn(|| {
                    for it in part {
                        each(it);
                    }
                });
            }
        });
    }
}
