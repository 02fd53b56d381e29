//! Path error types.
//!
//! These errors report caller misuse or a broken invariant in the path
//! algorithm. None of them are transient, so none are worth retrying.

use super::{InvalidSegment, Station};

/// Errors returned by [`Path`](super::Path) operations.
///
/// A failed operation never leaves the path partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Segment failed its own construction checks
    #[error(transparent)]
    InvalidSegment(#[from] InvalidSegment),

    /// Neither end of the new segment is on a non-empty path
    #[error("new segment {up} -> {down} touches no station on the line")]
    DisjointSegment { up: Station, down: Station },

    /// A segment with the same up and down stations already exists
    #[error("segment {up} -> {down} already exists on the line")]
    DuplicateSegment { up: Station, down: Station },

    /// Both ends are already on the path, so adding it would branch or loop
    #[error("stations {up} and {down} are both already on the line")]
    AlreadyConnected { up: Station, down: Station },

    /// The split would leave a remainder of zero or negative length
    #[error(
        "inserted segment (length {inserted}) must be shorter than the segment it splits (length {existing})"
    )]
    SegmentTooLong { existing: i64, inserted: i64 },

    /// Joining two segments would exceed the largest representable length
    #[error("combined length of {left} and {right} is too large")]
    LengthOverflow { left: i64, right: i64 },

    /// Removal would leave the line without any segment
    #[error("a line must keep at least one segment")]
    NotEnoughSegments,

    /// Only the trailing terminal can be removed
    #[error("{0} is not the trailing terminal station")]
    NotTerminalStation(Station),

    /// Station is not on the path at all
    #[error("{0} is not on the line")]
    StationNotFound(Station),

    /// Segments no longer form a single simple chain
    #[error("broken path at {station}: {reason}")]
    BrokenPath {
        station: Station,
        reason: &'static str,
    },
}
