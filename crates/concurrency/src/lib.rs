//! Optimistic concurrency helpers for fuzzdex
//!
//! Dictionary words are protected by a unique index rather than locks. A
//! writer that loses the race to create a word reports a collision and the
//! whole lookup-then-create step is retried with randomized backoff.

pub mod collision;

pub use collision::{retry_on_collision, Attempt, BackoffWindow, RetryPolicy};
