//! Path maintenance for a single line.
//!
//! A `Path` owns the segments of one line. Storage order is whatever the
//! insertions produced; the station order is always recovered by walking
//! adjacency, never by trusting positions in the vector.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PathError, Segment, Station};

/// Where an inserted segment ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Added at a terminal (or as the first segment)
    Terminal,
    /// Split an existing segment that starts where the new one starts
    SplitFront,
    /// Split an existing segment that ends where the new one ends
    SplitBack,
}

/// Which end of an existing segment the new segment shares.
#[derive(Debug, Clone, Copy)]
enum Split {
    Front,
    Back,
}

/// Segments that left the path on a successful station removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The leading terminal was removed along with its outgoing segment
    Leading(Segment),
    /// The trailing terminal was removed along with its incoming segment
    Trailing(Segment),
    /// An interior station was removed; its two segments became one
    Merged {
        incoming: Segment,
        outgoing: Segment,
        merged: Segment,
    },
}

/// The ordered chain of segments belonging to one line.
///
/// # Invariants
///
/// After every successful operation:
/// - The segments form exactly one simple directed chain (or none at all)
/// - No two segments share the same `(up, down)` pair
///
/// # Examples
///
/// ```
/// use subway_line::domain::{LineId, Path, Segment, Station};
///
/// let st = |s: &str| Station::new(s).unwrap();
/// let seg = |u: &str, d: &str, len| Segment::new(LineId(1), st(u), st(d), len).unwrap();
///
/// let mut path = Path::new();
/// path.insert(seg("A", "B", 10)).unwrap();
/// path.insert(seg("B", "C", 10)).unwrap();
/// path.insert(seg("A", "X", 4)).unwrap();
///
/// let names: Vec<&str> = path.ordered_stations().unwrap().map(|s| s.as_str()).collect();
/// assert_eq!(names, ["A", "X", "B", "C"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a path from previously stored segments.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::BrokenPath`] if the segments branch, loop, or
    /// fall apart into more than one chain.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, PathError> {
        let path = Path { segments };
        path.check_chain()?;
        Ok(path)
    }

    /// Segments in storage order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consumes the path and returns its segments in storage order.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment lengths, or `None` if it does not fit in an `i64`.
    pub fn total_length(&self) -> Option<i64> {
        self.segments
            .iter()
            .try_fold(0i64, |total, s| total.checked_add(s.length()))
    }

    /// Returns true if any segment starts or ends at `station`.
    pub fn contains_station(&self, station: &Station) -> bool {
        self.segments.iter().any(|s| s.contains_station(station))
    }

    /// Insert a segment, splitting an existing one if it lands inside it.
    ///
    /// On a non-empty path the new segment must share exactly one station
    /// with the path. If an existing segment starts where the new one starts
    /// (or ends where it ends), that segment is split in two: the new
    /// segment takes its slot and the remainder is appended. Otherwise the
    /// segment extends the path at a terminal and is appended.
    ///
    /// # Errors
    ///
    /// - [`PathError::DisjointSegment`] if it touches no station on the path
    /// - [`PathError::DuplicateSegment`] if the exact pair is already present
    /// - [`PathError::AlreadyConnected`] if both stations are already present
    /// - [`PathError::SegmentTooLong`] if it is not shorter than the segment it splits
    pub fn insert(&mut self, segment: Segment) -> Result<Placement, PathError> {
        self.validate_insert(&segment)?;

        let Some((index, split)) = self.splice_point(&segment) else {
            self.segments.push(segment);
            debug!(segments = self.segments.len(), "Extended path at terminal");
            return Ok(Placement::Terminal);
        };

        let existing = &self.segments[index];
        let remaining = existing.split_distance(&segment);
        if remaining <= 0 {
            return Err(PathError::SegmentTooLong {
                existing: existing.length(),
                inserted: segment.length(),
            });
        }

        let (up, down, placement) = match split {
            Split::Front => (
                segment.down().clone(),
                existing.down().clone(),
                Placement::SplitFront,
            ),
            Split::Back => (
                existing.up().clone(),
                segment.up().clone(),
                Placement::SplitBack,
            ),
        };
        let remainder = Segment::new(existing.line(), up, down, remaining)?;

        debug!(
            split_up = %existing.up(),
            split_down = %existing.down(),
            ?placement,
            remaining,
            segments = self.segments.len() + 1,
            "Split segment"
        );

        self.segments[index] = segment;
        self.segments.push(remainder);
        Ok(placement)
    }

    fn validate_insert(&self, segment: &Segment) -> Result<(), PathError> {
        if self.segments.is_empty() {
            return Ok(());
        }

        let has_up = self.contains_station(segment.up());
        let has_down = self.contains_station(segment.down());

        if !has_up && !has_down {
            return Err(PathError::DisjointSegment {
                up: segment.up().clone(),
                down: segment.down().clone(),
            });
        }

        if self.segments.iter().any(|s| s.same_stations(segment)) {
            return Err(PathError::DuplicateSegment {
                up: segment.up().clone(),
                down: segment.down().clone(),
            });
        }

        if has_up && has_down {
            return Err(PathError::AlreadyConnected {
                up: segment.up().clone(),
                down: segment.down().clone(),
            });
        }

        Ok(())
    }

    /// First segment, in storage order, that the new segment lands inside.
    fn splice_point(&self, segment: &Segment) -> Option<(usize, Split)> {
        self.segments.iter().enumerate().find_map(|(i, s)| {
            if s.shares_up_station(segment) {
                Some((i, Split::Front))
            } else if s.shares_down_station(segment) {
                Some((i, Split::Back))
            } else {
                None
            }
        })
    }

    /// Stations in path order, from the leading to the trailing terminal.
    ///
    /// The iterator walks the current segments each time it is created, so
    /// calling this again after a mutation reflects the new path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::BrokenPath`] if a station has more than one
    /// successor or predecessor, or the segments form a cycle.
    pub fn ordered_stations(&self) -> Result<Stations<'_>, PathError> {
        let adjacency = Adjacency::build(&self.segments)?;
        let start = adjacency.start(&self.segments)?;
        Ok(Stations {
            by_up: adjacency.by_up,
            next: start,
            remaining: if self.segments.is_empty() {
                0
            } else {
                self.segments.len() + 1
            },
        })
    }

    /// Owned copy of [`ordered_stations`](Self::ordered_stations).
    pub fn station_list(&self) -> Result<Vec<Station>, PathError> {
        Ok(self.ordered_stations()?.cloned().collect())
    }

    /// The leading and trailing terminals, or `None` for an empty path.
    pub fn terminals(&self) -> Result<Option<(&Station, &Station)>, PathError> {
        let mut stations = self.ordered_stations()?;
        let Some(first) = stations.next() else {
            return Ok(None);
        };
        let last = stations.last().unwrap_or(first);
        Ok(Some((first, last)))
    }

    /// Remove the trailing terminal station and the segment leading to it.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotEnoughSegments`] if at most one segment is left
    /// - [`PathError::NotTerminalStation`] if `station` is not the trailing terminal
    pub fn remove_terminal(&mut self, station: &Station) -> Result<Segment, PathError> {
        if self.segments.len() <= 1 {
            return Err(PathError::NotEnoughSegments);
        }

        let is_trailing = matches!(self.terminals()?, Some((_, last)) if last == station);
        if !is_trailing {
            return Err(PathError::NotTerminalStation(station.clone()));
        }

        let index = self
            .segments
            .iter()
            .position(|s| s.down() == station)
            .ok_or_else(|| PathError::NotTerminalStation(station.clone()))?;
        let removed = self.segments.remove(index);

        debug!(
            station = %station,
            segments = self.segments.len(),
            "Removed trailing terminal"
        );
        Ok(removed)
    }

    /// Remove any station, re-linking the path around it.
    ///
    /// A terminal loses its only segment. An interior station's incoming and
    /// outgoing segments are replaced by one segment spanning both, whose
    /// length is their sum; it takes the incoming segment's slot.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotEnoughSegments`] if at most one segment is left
    /// - [`PathError::StationNotFound`] if `station` is not on the path
    /// - [`PathError::LengthOverflow`] if the merged length does not fit
    pub fn remove_station(&mut self, station: &Station) -> Result<Removal, PathError> {
        if self.segments.len() <= 1 {
            return Err(PathError::NotEnoughSegments);
        }

        let incoming = self.segments.iter().position(|s| s.down() == station);
        let outgoing = self.segments.iter().position(|s| s.up() == station);

        let removal = match (incoming, outgoing) {
            (Some(i), Some(o)) => {
                let before = &self.segments[i];
                let after = &self.segments[o];
                let length = before
                    .length()
                    .checked_add(after.length())
                    .ok_or(PathError::LengthOverflow {
                        left: before.length(),
                        right: after.length(),
                    })?;
                let merged = Segment::new(
                    before.line(),
                    before.up().clone(),
                    after.down().clone(),
                    length,
                )?;

                let incoming = std::mem::replace(&mut self.segments[i], merged.clone());
                let outgoing = self.segments.remove(o);
                Removal::Merged {
                    incoming,
                    outgoing,
                    merged,
                }
            }
            (Some(i), None) => Removal::Trailing(self.segments.remove(i)),
            (None, Some(o)) => Removal::Leading(self.segments.remove(o)),
            (None, None) => return Err(PathError::StationNotFound(station.clone())),
        };

        debug!(
            station = %station,
            segments = self.segments.len(),
            "Removed station"
        );
        Ok(removal)
    }

    /// Checks that the segments form one simple chain.
    fn check_chain(&self) -> Result<(), PathError> {
        let visited = self.ordered_stations()?.count();
        match self.segments.first() {
            Some(first) if visited != self.segments.len() + 1 => Err(PathError::BrokenPath {
                station: first.up().clone(),
                reason: "segments do not form a single chain",
            }),
            _ => Ok(()),
        }
    }
}

impl TryFrom<Vec<Segment>> for Path {
    type Error = PathError;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        Path::from_segments(segments)
    }
}

impl From<Path> for Vec<Segment> {
    fn from(path: Path) -> Self {
        path.segments
    }
}

/// Successor and predecessor lookup keyed by station.
struct Adjacency<'a> {
    by_up: HashMap<&'a Station, &'a Segment>,
    by_down: HashMap<&'a Station, &'a Segment>,
}

impl<'a> Adjacency<'a> {
    fn build(segments: &'a [Segment]) -> Result<Self, PathError> {
        let mut by_up = HashMap::with_capacity(segments.len());
        let mut by_down = HashMap::with_capacity(segments.len());

        for segment in segments {
            if by_up.insert(segment.up(), segment).is_some() {
                return Err(PathError::BrokenPath {
                    station: segment.up().clone(),
                    reason: "more than one segment leaves this station",
                });
            }
            if by_down.insert(segment.down(), segment).is_some() {
                return Err(PathError::BrokenPath {
                    station: segment.down().clone(),
                    reason: "more than one segment arrives at this station",
                });
            }
        }

        Ok(Adjacency { by_up, by_down })
    }

    /// Walks backwards from the first stored segment to the leading terminal.
    fn start(&self, segments: &'a [Segment]) -> Result<Option<&'a Station>, PathError> {
        let Some(mut current) = segments.first() else {
            return Ok(None);
        };

        // A chain of n segments has its start at most n - 1 hops back.
        for _ in 0..segments.len() {
            match self.by_down.get(current.up()) {
                Some(previous) => current = previous,
                None => return Ok(Some(current.up())),
            }
        }

        Err(PathError::BrokenPath {
            station: current.up().clone(),
            reason: "segments form a cycle",
        })
    }
}

/// Iterator over the stations of a [`Path`] in path order.
///
/// Created by [`Path::ordered_stations`].
#[derive(Debug)]
pub struct Stations<'a> {
    by_up: HashMap<&'a Station, &'a Segment>,
    next: Option<&'a Station>,
    remaining: usize,
}

impl<'a> Iterator for Stations<'a> {
    type Item = &'a Station;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next.take()?;
        self.remaining -= 1;
        self.next = self.by_up.get(current).map(|s| s.down());
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineId;

    fn st(s: &str) -> Station {
        Station::new(s).unwrap()
    }

    fn seg(up: &str, down: &str, length: i64) -> Segment {
        Segment::new(LineId(1), st(up), st(down), length).unwrap()
    }

    fn names(path: &Path) -> Vec<String> {
        path.ordered_stations()
            .unwrap()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    fn path_of(segments: &[(&str, &str, i64)]) -> Path {
        let mut path = Path::new();
        for (up, down, length) in segments {
            path.insert(seg(up, down, *length)).unwrap();
        }
        path
    }

    fn length_between(path: &Path, up: &str, down: &str) -> Option<i64> {
        path.segments()
            .iter()
            .find(|s| s.up() == &st(up) && s.down() == &st(down))
            .map(Segment::length)
    }

    #[test]
    fn empty_path_has_no_stations() {
        let path = Path::new();
        assert!(path.is_empty());
        assert_eq!(path.ordered_stations().unwrap().count(), 0);
        assert_eq!(path.terminals().unwrap(), None);
    }

    #[test]
    fn first_insert_is_accepted() {
        let mut path = Path::new();
        assert_eq!(path.insert(seg("A", "B", 10)), Ok(Placement::Terminal));
        assert_eq!(names(&path), ["A", "B"]);
    }

    #[test]
    fn extend_at_trailing_terminal() {
        let mut path = path_of(&[("A", "B", 10)]);
        assert_eq!(path.insert(seg("B", "C", 5)), Ok(Placement::Terminal));
        assert_eq!(names(&path), ["A", "B", "C"]);
    }

    #[test]
    fn extend_at_leading_terminal() {
        let mut path = path_of(&[("A", "B", 10)]);
        assert_eq!(path.insert(seg("Z", "A", 5)), Ok(Placement::Terminal));
        assert_eq!(names(&path), ["Z", "A", "B"]);
        // Storage order differs from path order
        assert_eq!(path.segments()[0], seg("A", "B", 10));
    }

    #[test]
    fn split_front() {
        let mut path = path_of(&[("A", "B", 10)]);
        assert_eq!(path.insert(seg("A", "X", 4)), Ok(Placement::SplitFront));
        assert_eq!(names(&path), ["A", "X", "B"]);
        assert_eq!(path.segments(), [seg("A", "X", 4), seg("X", "B", 6)]);
    }

    #[test]
    fn split_back() {
        let mut path = path_of(&[("A", "B", 10)]);
        assert_eq!(path.insert(seg("X", "B", 3)), Ok(Placement::SplitBack));
        assert_eq!(names(&path), ["A", "X", "B"]);
        assert_eq!(path.segments(), [seg("X", "B", 3), seg("A", "X", 7)]);
    }

    #[test]
    fn split_keeps_line_of_original_segment() {
        let mut path = Path::new();
        path.insert(Segment::new(LineId(9), st("A"), st("B"), 10).unwrap())
            .unwrap();
        path.insert(Segment::new(LineId(9), st("A"), st("X"), 4).unwrap())
            .unwrap();
        assert!(path.segments().iter().all(|s| s.line() == LineId(9)));
    }

    #[test]
    fn rejects_disjoint_segment() {
        let mut path = path_of(&[("A", "B", 10)]);
        let err = path.insert(seg("C", "D", 3)).unwrap_err();
        assert_eq!(
            err,
            PathError::DisjointSegment {
                up: st("C"),
                down: st("D")
            }
        );
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn rejects_duplicate_segment() {
        let mut path = path_of(&[("A", "B", 10)]);
        let err = path.insert(seg("A", "B", 3)).unwrap_err();
        assert_eq!(
            err,
            PathError::DuplicateSegment {
                up: st("A"),
                down: st("B")
            }
        );
    }

    #[test]
    fn rejects_segment_closing_a_loop() {
        let mut path = path_of(&[("A", "B", 10), ("B", "C", 10)]);
        let before = path.clone();

        assert!(matches!(
            path.insert(seg("C", "A", 3)),
            Err(PathError::AlreadyConnected { .. })
        ));
        assert!(matches!(
            path.insert(seg("A", "C", 3)),
            Err(PathError::AlreadyConnected { .. })
        ));
        assert!(matches!(
            path.insert(seg("B", "A", 3)),
            Err(PathError::AlreadyConnected { .. })
        ));
        assert_eq!(path, before);
    }

    #[test]
    fn rejects_segment_too_long() {
        let mut path = path_of(&[("A", "B", 10)]);
        let before = names(&path);

        assert_eq!(
            path.insert(seg("A", "X", 10)),
            Err(PathError::SegmentTooLong {
                existing: 10,
                inserted: 10
            })
        );
        assert_eq!(
            path.insert(seg("X", "B", 15)),
            Err(PathError::SegmentTooLong {
                existing: 10,
                inserted: 15
            })
        );
        assert_eq!(names(&path), before);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn scenario_build_split_and_trim() {
        let mut path = Path::new();
        path.insert(seg("A", "B", 10)).unwrap();
        assert_eq!(names(&path), ["A", "B"]);

        path.insert(seg("B", "C", 10)).unwrap();
        assert_eq!(names(&path), ["A", "B", "C"]);

        path.insert(seg("A", "X", 4)).unwrap();
        assert_eq!(names(&path), ["A", "X", "B", "C"]);
        assert_eq!(length_between(&path, "X", "B"), Some(6));

        assert_eq!(
            path.remove_terminal(&st("X")),
            Err(PathError::NotTerminalStation(st("X")))
        );
        assert_eq!(path.remove_terminal(&st("C")), Ok(seg("B", "C", 10)));
        assert_eq!(names(&path), ["A", "X", "B"]);
    }

    #[test]
    fn remove_terminal_needs_two_segments() {
        let mut path = path_of(&[("A", "B", 10)]);
        assert_eq!(
            path.remove_terminal(&st("B")),
            Err(PathError::NotEnoughSegments)
        );
        assert_eq!(
            Path::new().remove_terminal(&st("B")),
            Err(PathError::NotEnoughSegments)
        );
    }

    #[test]
    fn remove_terminal_rejects_leading_terminal() {
        let mut path = path_of(&[("A", "B", 10), ("B", "C", 10)]);
        assert_eq!(
            path.remove_terminal(&st("A")),
            Err(PathError::NotTerminalStation(st("A")))
        );
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn remove_interior_station_merges_segments() {
        let mut path = path_of(&[("A", "B", 10), ("B", "C", 7)]);
        let removal = path.remove_station(&st("B")).unwrap();

        assert_eq!(
            removal,
            Removal::Merged {
                incoming: seg("A", "B", 10),
                outgoing: seg("B", "C", 7),
                merged: seg("A", "C", 17),
            }
        );
        assert_eq!(names(&path), ["A", "C"]);
        assert_eq!(path.total_length(), Some(17));
    }

    #[test]
    fn remove_leading_and_trailing_station() {
        let mut path = path_of(&[("A", "B", 10), ("B", "C", 10), ("C", "D", 10)]);

        assert_eq!(
            path.remove_station(&st("A")),
            Ok(Removal::Leading(seg("A", "B", 10)))
        );
        assert_eq!(names(&path), ["B", "C", "D"]);

        assert_eq!(
            path.remove_station(&st("D")),
            Ok(Removal::Trailing(seg("C", "D", 10)))
        );
        assert_eq!(names(&path), ["B", "C"]);

        assert_eq!(
            path.remove_station(&st("B")),
            Err(PathError::NotEnoughSegments)
        );
    }

    #[test]
    fn remove_unknown_station() {
        let mut path = path_of(&[("A", "B", 10), ("B", "C", 10)]);
        assert_eq!(
            path.remove_station(&st("Q")),
            Err(PathError::StationNotFound(st("Q")))
        );
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn ordered_stations_is_repeatable() {
        let path = path_of(&[("B", "C", 3), ("A", "B", 2), ("C", "D", 4)]);
        assert_eq!(names(&path), names(&path));
        assert_eq!(names(&path), ["A", "B", "C", "D"]);
    }

    #[test]
    fn terminals_follow_path_order() {
        let path = path_of(&[("B", "C", 3), ("A", "B", 2)]);
        assert_eq!(path.terminals().unwrap(), Some((&st("A"), &st("C"))));
    }

    #[test]
    fn from_segments_accepts_any_storage_order() {
        let path =
            Path::from_segments(vec![seg("C", "D", 1), seg("A", "B", 1), seg("B", "C", 1)])
                .unwrap();
        assert_eq!(names(&path), ["A", "B", "C", "D"]);
    }

    #[test]
    fn from_segments_rejects_branch() {
        let err = Path::from_segments(vec![seg("A", "B", 1), seg("A", "C", 1)]).unwrap_err();
        assert_eq!(
            err,
            PathError::BrokenPath {
                station: st("A"),
                reason: "more than one segment leaves this station",
            }
        );

        let err = Path::from_segments(vec![seg("A", "C", 1), seg("B", "C", 1)]).unwrap_err();
        assert!(matches!(err, PathError::BrokenPath { .. }));
    }

    #[test]
    fn from_segments_rejects_cycle() {
        let err = Path::from_segments(vec![seg("A", "B", 1), seg("B", "C", 1), seg("C", "A", 1)])
            .unwrap_err();
        assert_eq!(
            err,
            PathError::BrokenPath {
                station: st("A"),
                reason: "segments form a cycle",
            }
        );
    }

    #[test]
    fn from_segments_rejects_disconnected_pieces() {
        let err = Path::from_segments(vec![seg("A", "B", 1), seg("C", "D", 1)]).unwrap_err();
        assert_eq!(
            err,
            PathError::BrokenPath {
                station: st("A"),
                reason: "segments do not form a single chain",
            }
        );
    }

    #[test]
    fn merge_overflow_leaves_path_unchanged() {
        let mut path = path_of(&[("A", "B", i64::MAX), ("B", "C", i64::MAX)]);
        let before = path.clone();

        assert_eq!(
            path.remove_station(&st("B")),
            Err(PathError::LengthOverflow {
                left: i64::MAX,
                right: i64::MAX
            })
        );
        assert_eq!(path, before);
    }

    #[test]
    fn total_length_overflow() {
        let path = path_of(&[("A", "B", i64::MAX), ("B", "C", 1)]);
        assert_eq!(path.total_length(), None);

        let path = path_of(&[("A", "B", i64::MAX - 1), ("B", "C", 1)]);
        assert_eq!(path.total_length(), Some(i64::MAX));
    }

    #[test]
    fn serde_roundtrip_validates_chain() {
        let path = path_of(&[("A", "B", 10), ("A", "X", 4)]);
        let json = serde_json::to_string(&path).unwrap();
        let restored: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, path);

        let branched = r#"[
            {"line":1,"up":"A","down":"B","length":1},
            {"line":1,"up":"A","down":"C","length":1}
        ]"#;
        assert!(serde_json::from_str::<Path>(branched).is_err());
    }
}
