//! Transport reliability policy.
//!
//! A single bounded retry policy shared by every chain family's transport:
//! ```text
//! Request → [RetryPolicy] → [Transport]
//! ```

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy};
