//! # Queue Module
//!
//! The bounded queue that connects pipeline stages.
//!
//! ## End-of-stream
//! A queue has no sentinel items. Every thread that will add items holds a
//! [`Producer`] lease for as long as it might enqueue. Consumers receive
//! `None` from [`BoundedQueue::dequeue`] only when the buffer is empty and no
//! lease is left, so any number of producers can finish independently.
//!
//! Leases must be taken before consumers start: a queue that never had a
//! producer looks exactly like one whose producers are all finished.
//!
//! ## Example
//! ```rust,ignore
//! let queue = BoundedQueue::new(50)?;
//! let producer = queue.register_producer();
//!
//! std::thread::spawn(move || {
//!     producer.enqueue(PathBuf::from("/data"))?;
//!     // lease released here
//! });
//!
//! for dir in queue.drain() {
//!     println!("{}", dir.display());
//! }
//! ```

mod bounded;

pub use bounded::{BoundedQueue, Producer};

use std::fmt;

/// Returned by [`Producer::enqueue`] after the queue was closed.
///
/// Holds the item that could not be added.
#[derive(PartialEq, Eq)]
pub struct Closed<T>(pub T);

impl<T> fmt::Debug for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Closed(..)")
    }
}

impl<T> fmt::Display for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("enqueue on a closed queue")
    }
}

impl<T> std::error::Error for Closed<T> {}

/// Blocking iterator returned by [`BoundedQueue::drain`].
///
/// Ends at end-of-stream.
pub struct Drain<'a, T> {
    queue: &'a BoundedQueue<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.dequeue()
    }
}
