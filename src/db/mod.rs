//! Persistence handle for notification records.
//!
//! An in-process store guarded by a single async mutex, optionally mirrored to
//! a JSON snapshot file after every write.

mod store;

pub use store::{Store, StoreState};
