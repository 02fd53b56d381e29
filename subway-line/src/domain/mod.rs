//! Domain types for subway line maintenance.
//!
//! This module contains the path-maintenance core: station identities,
//! segments between them, and the `Path` that keeps a line's segments a
//! single simple chain. Everything here is in-memory and synchronous;
//! persistence and transport belong to the caller.

mod error;
mod path;
mod segment;
mod station;

pub use error::PathError;
pub use path::{Path, Placement, Removal, Stations};
pub use segment::{InvalidSegment, Segment};
pub use station::{InvalidStation, LineId, Station};
