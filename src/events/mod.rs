//! # Events Module
//!
//! Best-effort diagnostics emitted by the pipeline workers.
//!
//! ## Design
//! Workers push events into a channel; any UI may listen. Nothing in the
//! pipeline depends on the events being received.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Copy(CopyEvent::Copied { destination, .. }) = event {
//!             println!("copied {}", destination.display());
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
