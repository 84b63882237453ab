//! Pagination module
//!
//! Page/page-size model and the guarded fetch controller.
//!
//! # Overview
//!
//! The controller is a pure function of the pagination model, the last
//! result page and the store's fetch status. It never touches the store;
//! it only answers "fetch this page now" or "skip, and why".

mod controller;
mod types;

pub use controller::{decide, FetchController, FetchDecision, SkipReason};
pub use types::{PageRequest, PageSizeOptions, PaginationModel, ResultPage};
