//! Horizon profile batch computation
//!
//! Pulls every venue without a profile, computes profiles on a pool of
//! workers that each own an obstacle connection, and saves the results in
//! fixed-size transactional batches.

pub mod buffer;
pub mod driver;
pub mod progress;

pub use buffer::*;
pub use driver::*;
pub use progress::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to load pending points: {0}")]
    Backlog(String),

    #[error("Invalid batch options: {0}")]
    InvalidOptions(String),
}

pub type BatchResult<T> = Result<T, BatchError>;
