//! Polling pipeline.
//!
//! - `dedup`: two-generation cache of checked paste keys
//! - `backoff`: wait policy per batch fetch status
//! - `poll`: the fetch, classify and persist loop

pub mod backoff;
pub mod dedup;
pub mod poll;

pub use backoff::Backoff;
pub use dedup::{CycleEnd, DedupCache};
pub use poll::{CycleReport, PollController, PollStats};
