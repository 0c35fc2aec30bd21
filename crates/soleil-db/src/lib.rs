//! PostGIS access layer
//!
//! Works against an existing schema, no migrations:
//!
//! - `venues (id, name, address, geometry Point/4326)`
//! - `buildings (id, geometry Polygon|MultiPolygon/4326, height, ground_altitude)`
//! - `horizon_profiles (venue_id PK → venues.id, profile float8[360], computed_at)`

pub mod client;
pub mod footprint;
pub mod queries;
pub mod schema;

pub use client::*;
pub use footprint::*;
pub use schema::*;

use soleil_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Invalid stored data: {0}")]
    InvalidData(#[from] CoreError),
}

pub type DbResult<T> = Result<T, DbError>;
