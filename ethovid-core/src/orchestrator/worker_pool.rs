// ============================================================================
// ethovid-core/src/orchestrator/worker_pool.rs
// ============================================================================
//
// WORKER POOL: Fixed-size Pool Over a Priority Queue (component F)
//
// Generalizes the teacher's `encoding::parallel` threading patterns from
// data-parallel chapter encoding to the spec's job-level worker pool: a
// fixed number of threads each block-pop one job at a time off a priority
// queue (binary heap keyed by priority weight, FIFO within a priority).
// `rayon` is dropped (see DESIGN.md) since this is an explicit fixed-size
// pool of long-lived workers, not short-lived data-parallel tasks.
//
// AI-ASSISTANT-INFO: Priority work queue and fixed-size worker pool (component F)

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};

use crate::orchestrator::priority::JobPriority;

struct QueuedItem<T> {
    priority: JobPriority,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for QueuedItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}
impl<T> Eq for QueuedItem<T> {}

impl<T> PartialOrd for QueuedItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueuedItem<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: higher priority weight pops first; for
        // equal priority, the earlier sequence number pops first (FIFO),
        // so we reverse the sequence comparison.
        self.priority
            .weight()
            .cmp(&other.priority.weight())
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Thread-safe priority queue: push with a priority tag, blocking pop in
/// priority order (FIFO within a priority level).
pub struct PriorityQueue<T> {
    state: Mutex<BinaryHeap<QueuedItem<T>>>,
    not_empty: Condvar,
    sequence_counter: AtomicU64,
    closed: AtomicBool,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BinaryHeap::new()),
            not_empty: Condvar::new(),
            sequence_counter: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn push(&self, priority: JobPriority, item: T) {
        let sequence = self.sequence_counter.fetch_add(1, AtomicOrdering::SeqCst);
        let mut heap = self.state.lock().expect("priority queue lock poisoned");
        heap.push(QueuedItem { priority, sequence, item });
        self.not_empty.notify_one();
    }

    /// Blocks until an item is available or the queue is closed (returns `None`).
    pub fn pop_blocking(&self) -> Option<T> {
        let mut heap = self.state.lock().expect("priority queue lock poisoned");
        loop {
            if let Some(queued) = heap.pop() {
                return Some(queued.item);
            }
            if self.closed.load(AtomicOrdering::SeqCst) {
                return None;
            }
            heap = self.not_empty.wait(heap).expect("priority queue lock poisoned");
        }
    }

    /// Wakes every blocked worker so they observe shutdown and exit.
    pub fn close(&self) {
        self.closed.store(true, AtomicOrdering::SeqCst);
        self.not_empty.notify_all();
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns `pool_size` worker threads, each looping: block-pop one item,
/// run `handler` on it, repeat until the queue is closed.
pub fn spawn_workers<T, F>(pool_size: usize, queue: Arc<PriorityQueue<T>>, handler: F) -> Vec<std::thread::JoinHandle<()>>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    (0..pool_size.max(1))
        .map(|worker_index| {
            let queue = queue.clone();
            let handler = handler.clone();
            std::thread::Builder::new()
                .name(format!("ethovid-worker-{worker_index}"))
                .spawn(move || {
                    while let Some(item) = queue.pop_blocking() {
                        handler(item);
                    }
                })
                .expect("failed to spawn orchestrator worker thread")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_highest_priority_first() {
        let queue: PriorityQueue<&'static str> = PriorityQueue::new();
        queue.push(JobPriority::Low, "low");
        queue.push(JobPriority::Urgent, "urgent");
        queue.push(JobPriority::Normal, "normal");

        assert_eq!(queue.pop_blocking(), Some("urgent"));
        assert_eq!(queue.pop_blocking(), Some("normal"));
        assert_eq!(queue.pop_blocking(), Some("low"));
    }

    #[test]
    fn fifo_within_equal_priority() {
        let queue: PriorityQueue<i32> = PriorityQueue::new();
        queue.push(JobPriority::Normal, 1);
        queue.push(JobPriority::Normal, 2);
        queue.push(JobPriority::Normal, 3);

        assert_eq!(queue.pop_blocking(), Some(1));
        assert_eq!(queue.pop_blocking(), Some(2));
        assert_eq!(queue.pop_blocking(), Some(3));
    }

    #[test]
    fn closed_empty_queue_returns_none() {
        let queue: PriorityQueue<i32> = PriorityQueue::new();
        queue.close();
        assert_eq!(queue.pop_blocking(), None);
    }
}
