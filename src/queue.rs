//! Bounded FIFO between the name producer and request handlers.
//!
//! Two semaphores track free slots and filled slots; the items themselves sit
//! in a `VecDeque` behind a short-lived mutex. A permit on `filled` is a claim
//! on exactly one item, so concurrent `pop` calls never see the same item, and
//! a `pop` that times out has claimed nothing and leaves the queue untouched.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error_handling::QueueError;

/// Fixed-capacity FIFO with async blocking push and pop-with-timeout.
pub struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    free: Semaphore,
    filled: Semaphore,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        BoundedQueue {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            free: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            capacity,
        }
    }

    /// Appends `item`, waiting for a free slot if the queue is full.
    pub async fn push(&self, item: T) {
        // The semaphore is never closed, so acquire only fails if that changes
        if let Ok(permit) = self.free.acquire().await {
            permit.forget();
        }
        self.lock().push_back(item);
        self.filled.add_permits(1);
    }

    /// Appends `item` only if a slot is free right now.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        match self.free.try_acquire() {
            Ok(permit) => {
                permit.forget();
                self.lock().push_back(item);
                self.filled.add_permits(1);
                Ok(())
            }
            Err(_) => Err(item),
        }
    }

    /// Removes the oldest item, waiting up to `timeout` for one to arrive.
    pub async fn pop(&self, timeout: Duration) -> Result<T, QueueError> {
        match tokio::time::timeout(timeout, self.filled.acquire()).await {
            Ok(Ok(permit)) => {
                permit.forget();
                self.take_claimed()
            }
            Ok(Err(_)) | Err(_) => Err(QueueError::Timeout(timeout)),
        }
    }

    /// Removes the oldest item if one is available right now.
    pub fn try_pop(&self) -> Option<T> {
        let permit = self.filled.try_acquire().ok()?;
        permit.forget();
        self.take_claimed().ok()
    }

    /// Number of items currently queued. Advisory under concurrency.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no name is buffered. Advisory under concurrency.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no free slot is left. Advisory under concurrency.
    pub fn is_full(&self) -> bool {
        self.free.available_permits() == 0
    }

    /// Maximum number of buffered items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn take_claimed(&self) -> Result<T, QueueError> {
        // A filled permit is only issued after the push landed, so the deque
        // holds at least one item per claimed permit.
        let item = self.lock().pop_front();
        match item {
            Some(item) => {
                self.free.add_permits(1);
                Ok(item)
            }
            None => {
                log::error!("Claimed a queue slot with no item behind it");
                Err(QueueError::Timeout(Duration::ZERO))
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<T>> {
        match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
