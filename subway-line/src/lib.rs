//! Subway line maintenance.
//!
//! Keeps each line's station-to-station segments a single simple path:
//! inserting segments (splitting existing ones where needed), listing
//! stations in order, and removing stations.

pub mod domain;
pub mod line;
pub mod script;
