//! Core sunlight engine
//!
//! Horizon obstruction profiles, solar position, sunniness classification
//! and daily timelines. Everything in here is synchronous and free of I/O;
//! the boundary traits in [`pipeline`] are implemented by the database and
//! weather crates.

pub mod classify;
pub mod horizon;
pub mod nearby;
pub mod pipeline;
pub mod solar;
pub mod time;
pub mod timeline;
pub mod types;
pub mod weather;

pub use classify::*;
pub use horizon::*;
pub use nearby::*;
pub use pipeline::*;
pub use solar::*;
pub use timeline::*;
pub use types::*;
pub use weather::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Latitude out of range: {0}")]
    InvalidLatitude(f64),

    #[error("Longitude out of range: {0}")]
    InvalidLongitude(f64),

    #[error("Horizon profile must have 360 buckets, got {0}")]
    ProfileLength(usize),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Solar position error: {0}")]
    Solar(#[from] solar_positioning::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
