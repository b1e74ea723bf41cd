//! Change feed for live catalog updates.
//!
//! Every mutation that reaches disk is broadcast to in-process subscribers:
//! - Toy added, updated, removed
//! - Message added, removed
//!
//! Subscriptions support filtering by event kind and by toy id, and use
//! bounded buffers: a subscriber that falls behind is dropped rather than
//! slowing writers down.
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe(SubscriptionConfig {
//!     filter: SubscriptionFilter::messages_for(vec![toy_id]),
//!     ..Default::default()
//! });
//!
//! loop {
//!     match handle.recv() {
//!         Ok(StoreEvent::MessageAdded { message, .. }) => println!("{}", message.txt),
//!         Ok(StoreEvent::Dropped { .. }) | Err(_) => break,
//!         Ok(_) => {}
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
