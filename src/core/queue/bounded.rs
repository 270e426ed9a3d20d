//! Monitor-based bounded queue.

use super::{Closed, Drain};
use crate::error::QueueError;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

struct State<T> {
    buffer: Box<[Option<T>]>,
    front: usize,
    len: usize,
    producers: usize,
    closed: bool,
}

impl<T> State<T> {
    fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    fn is_done(&self) -> bool {
        self.closed || (self.len == 0 && self.producers == 0)
    }

    fn push_back(&mut self, item: T) {
        let rear = (self.front + self.len) % self.buffer.len();
        self.buffer[rear] = Some(item);
        self.len += 1;
    }

    fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.buffer[self.front].take();
        self.front = (self.front + 1) % self.buffer.len();
        self.len -= 1;
        item
    }
}

struct Shared<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty_or_done: Condvar,
    capacity: usize,
}

impl<T> Shared<T> {
    // Every critical section restores the invariants before it can panic,
    // so a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wake_all(&self) {
        self.not_full.notify_all();
        self.not_empty_or_done.notify_all();
    }
}

/// A fixed-capacity FIFO shared between producer and consumer threads.
///
/// Cloning the queue yields another handle to the same buffer. Items can
/// only be added through a [`Producer`] lease; [`dequeue`](Self::dequeue)
/// returns `None` once the buffer is empty and no lease is alive.
pub struct BoundedQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        let buffer = (0..capacity).map(|_| None).collect::<Vec<_>>();

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    buffer: buffer.into_boxed_slice(),
                    front: 0,
                    len: 0,
                    producers: 0,
                    closed: false,
                }),
                not_full: Condvar::new(),
                not_empty_or_done: Condvar::new(),
                capacity,
            }),
        })
    }

    /// Take out a producer lease.
    ///
    /// The queue cannot report end-of-stream while the lease is alive.
    pub fn register_producer(&self) -> Producer<T> {
        self.shared.lock().producers += 1;
        Producer {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Remove the oldest item, blocking while the queue is empty and a
    /// producer is still registered.
    ///
    /// Returns `None` when the queue is empty with no producers, or closed.
    pub fn dequeue(&self) -> Option<T> {
        let state = self.shared.lock();
        let mut state = self
            .shared
            .not_empty_or_done
            .wait_while(state, |s| !s.closed && s.len == 0 && s.producers > 0)
            .unwrap_or_else(PoisonError::into_inner);

        if state.closed {
            return None;
        }

        let item = state.pop_front()?;
        drop(state);
        self.shared.wake_all();
        Some(item)
    }

    /// Blocking iterator over [`dequeue`](Self::dequeue)
    pub fn drain(&self) -> Drain<'_, T> {
        Drain { queue: self }
    }

    /// Stop the queue.
    ///
    /// Wakes every waiter; afterwards `dequeue` returns `None` and enqueue
    /// hands the item back.
    pub fn close(&self) {
        self.shared.lock().closed = true;
        self.shared.wake_all();
    }

    /// Number of items currently buffered
    pub fn size(&self) -> usize {
        self.shared.lock().len
    }

    /// Maximum number of buffered items
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of live producer leases
    pub fn producers(&self) -> usize {
        self.shared.lock().producers
    }

    /// Whether `dequeue` would return `None` right now
    pub fn is_done(&self) -> bool {
        self.shared.lock().is_done()
    }

    /// Whether [`close`](Self::close) was called
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.shared.capacity)
            .field("len", &state.len)
            .field("producers", &state.producers)
            .field("closed", &state.closed)
            .finish()
    }
}

/// A producer registration on a [`BoundedQueue`].
///
/// Unregisters when dropped, including during unwinding.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Producer<T> {
    /// Append an item, blocking while the queue is full.
    pub fn enqueue(&self, item: T) -> Result<(), Closed<T>> {
        let state = self.shared.lock();
        let mut state = self
            .shared
            .not_full
            .wait_while(state, |s| !s.closed && s.is_full())
            .unwrap_or_else(PoisonError::into_inner);

        if state.closed {
            return Err(Closed(item));
        }

        state.push_back(item);
        drop(state);
        self.shared.wake_all();
        Ok(())
    }

    /// Release the lease. Same as dropping it.
    pub fn unregister(self) {}
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.producers -= 1;
        }
        self.shared.wake_all();
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Producer { .. }")
    }
}
