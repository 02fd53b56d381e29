//! Directed station-to-station segment of a line.

use serde::{Deserialize, Serialize};

use super::{LineId, Station};

/// Error returned when constructing an invalid segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSegment {
    /// Length was zero or negative
    #[error("segment length must be positive, got {0}")]
    NonPositiveLength(i64),

    /// Both ends are the same station
    #[error("segment cannot start and end at {0}")]
    SameStation(Station),
}

/// A directed edge from `up` to `down` with a positive length.
///
/// Segments are values: a split produces new segments rather than
/// editing an existing one in place.
///
/// # Examples
///
/// ```
/// use subway_line::domain::{LineId, Segment, Station};
///
/// let a = Station::new("A").unwrap();
/// let b = Station::new("B").unwrap();
///
/// let ab = Segment::new(LineId(1), a.clone(), b.clone(), 10).unwrap();
/// assert_eq!(ab.length(), 10);
/// assert!(ab.contains_station(&a));
///
/// // Zero length and loops are rejected
/// assert!(Segment::new(LineId(1), a.clone(), b, 0).is_err());
/// assert!(Segment::new(LineId(1), a.clone(), a, 5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSegment", into = "RawSegment")]
pub struct Segment {
    line: LineId,
    up: Station,
    down: Station,
    length: i64,
}

impl Segment {
    /// Construct a segment, validating its length and endpoints.
    pub fn new(
        line: LineId,
        up: Station,
        down: Station,
        length: i64,
    ) -> Result<Self, InvalidSegment> {
        if length <= 0 {
            return Err(InvalidSegment::NonPositiveLength(length));
        }
        if up == down {
            return Err(InvalidSegment::SameStation(up));
        }
        Ok(Segment {
            line,
            up,
            down,
            length,
        })
    }

    /// The line this segment belongs to.
    pub fn line(&self) -> LineId {
        self.line
    }

    /// The station this segment leaves from.
    pub fn up(&self) -> &Station {
        &self.up
    }

    /// The station this segment arrives at.
    pub fn down(&self) -> &Station {
        &self.down
    }

    /// Length between the two stations; always positive.
    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn shares_up_station(&self, other: &Segment) -> bool {
        self.up == other.up
    }

    pub fn shares_down_station(&self, other: &Segment) -> bool {
        self.down == other.down
    }

    /// Returns true if `(up, down)` matches `other` exactly.
    pub fn same_stations(&self, other: &Segment) -> bool {
        self.shares_up_station(other) && self.shares_down_station(other)
    }

    /// Returns true if `station` is either end of this segment.
    pub fn contains_station(&self, station: &Station) -> bool {
        self.up == *station || self.down == *station
    }

    /// Length left over when `other` is cut out of this segment.
    ///
    /// Not positive when `other` is at least as long as `self`; callers
    /// check the sign before building a segment from it.
    pub fn split_distance(&self, other: &Segment) -> i64 {
        self.length - other.length
    }
}

/// Unvalidated wire form of a [`Segment`].
#[derive(Serialize, Deserialize)]
struct RawSegment {
    line: LineId,
    up: Station,
    down: Station,
    length: i64,
}

impl TryFrom<RawSegment> for Segment {
    type Error = InvalidSegment;

    fn try_from(raw: RawSegment) -> Result<Self, Self::Error> {
        Segment::new(raw.line, raw.up, raw.down, raw.length)
    }
}

impl From<Segment> for RawSegment {
    fn from(segment: Segment) -> Self {
        RawSegment {
            line: segment.line,
            up: segment.up,
            down: segment.down,
            length: segment.length,
        }
    }
}
