//! Result store module
//!
//! Holds the last fetched page, its "has next page" flag and the fetch
//! status, and publishes every transition to subscribers.
//!
//! # Overview
//!
//! - `ResultStore` - Owns the snapshot and runs fetches against a `PageSource`
//! - `StoreSnapshot` - What subscribers observe
//!
//! The store publishes `Loading` before it awaits the source, so anyone
//! evaluating the fetch guard afterwards sees the in-flight fetch.

mod result_store;

pub use result_store::{ResultStore, StoreSnapshot};
