//! Service layer
//!
//! `ShortLinkStore` is the synchronization point above the storage backend;
//! `DeletionPool` feeds it soft-delete jobs in the background.

mod deletion;
mod link_store;

pub use deletion::DeletionPool;
pub use link_store::{CreateOutcome, ShortLinkStore};
