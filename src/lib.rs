#![warn(missing_docs)]
//! Persisted room layouts for a furniture-placement editor.
//!
//! A [`RoomLayoutStore`] holds the placed-object records of one room
//! (asset identity, position, orientation) and persists them as one
//! versioned binary file per room. The editor front end drives the store
//! through explicit method calls; on load, records are handed back through
//! a materialization callback so the caller can re-instantiate them in its
//! own scene representation.

mod error;
mod persist;
mod record;
mod store;

pub use error::*;
pub use persist::*;
pub use record::*;
pub use store::*;
