//! # Toy Catalog
//!
//! An in-memory, queryable catalog of toys that keeps a JSON file on disk
//! in step with every change.
//!
//! ## Core Concepts
//!
//! - **Store**: the authoritative collection; every mutation is flushed
//!   atomically before it returns
//! - **Query**: pure filter, sort and paginate over a snapshot
//! - **Messages**: notes attached to a toy, written through the store
//! - **Subscriptions**: live feed of committed changes
//!
//! ## Example
//!
//! ```ignore
//! use toy_catalog::{SortBy, SortField, StoreConfig, ToyDraft, ToyFilter, ToyStore, UserRef};
//!
//! let store = ToyStore::open(StoreConfig::at("data/toy.json"))?;
//!
//! let robot = store.create(
//!     ToyDraft::new("Robot", 10.0).with_labels(["tech"]),
//!     Some(UserRef::new("u1")),
//! )?;
//!
//! let page = store.query(
//!     &ToyFilter::new().text("rob"),
//!     &SortBy::asc(SortField::Price),
//!     Some(0),
//! );
//! ```

pub mod error;
pub mod ids;
mod messages;
pub mod params;
pub mod persist;
pub mod query;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{ErrorKind, Result, StoreError};
pub use ids::IdGenerator;
pub use params::{ListParams, ListQuery};
pub use persist::DataFile;
pub use query::{LabelMatch, Page, SortBy, SortField, SortOrder, StockFilter, ToyFilter};
pub use store::{StoreConfig, ToyStore};
pub use subscriptions::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use types::*;
