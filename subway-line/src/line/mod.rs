//! Lines and the registry that holds them.
//!
//! A `Line` pairs a name and colour with the `Path` of its segments.
//! The `LineRegistry` keeps lines in memory and serializes mutations
//! per line.

mod config;
mod registry;

pub use config::{LineConfig, REMOVAL_POLICY_VAR, RemovalPolicy};
pub use registry::{LineRegistry, RegistryError};

use serde::{Deserialize, Serialize};

use crate::domain::{LineId, Path, PathError, Placement, Segment, Station};

/// Error returned when a stored line fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidLine {
    /// The line has no segments
    #[error("{0} has no segments")]
    Empty(LineId),

    /// A segment is stamped with a different line
    #[error("{line} holds a segment belonging to {segment_line}")]
    ForeignSegment { line: LineId, segment_line: LineId },
}

/// A subway line: its identity, display attributes and path.
///
/// A line is created together with its first segment and never drops
/// below one segment afterwards. Every segment carries the line's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLine", into = "RawLine")]
pub struct Line {
    id: LineId,
    name: String,
    color: String,
    path: Path,
}

impl Line {
    /// Create a line with a single segment from `up` to `down`.
    pub fn new(
        id: LineId,
        name: impl Into<String>,
        color: impl Into<String>,
        up: Station,
        down: Station,
        length: i64,
    ) -> Result<Self, PathError> {
        let mut path = Path::new();
        path.insert(Segment::new(id, up, down, length)?)?;
        Ok(Line {
            id,
            name: name.into(),
            color: color.into(),
            path,
        })
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Change the display attributes; the path is untouched.
    pub fn rename(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.name = name.into();
        self.color = color.into();
    }

    /// Add a section between two stations, stamped with this line's id.
    pub fn add_section(
        &mut self,
        up: Station,
        down: Station,
        length: i64,
    ) -> Result<Placement, PathError> {
        let segment = Segment::new(self.id, up, down, length)?;
        self.path.insert(segment)
    }

    /// Stations in path order.
    pub fn stations(&self) -> Result<Vec<Station>, PathError> {
        self.path.station_list()
    }

    /// Remove a station according to `policy`.
    pub fn remove_station(
        &mut self,
        station: &Station,
        policy: RemovalPolicy,
    ) -> Result<(), PathError> {
        match policy {
            RemovalPolicy::TrailingTerminal => self.path.remove_terminal(station).map(drop),
            RemovalPolicy::AnyStation => self.path.remove_station(station).map(drop),
        }
    }
}

/// Unvalidated wire form of a [`Line`].
#[derive(Serialize, Deserialize)]
struct RawLine {
    id: LineId,
    name: String,
    color: String,
    path: Path,
}

impl TryFrom<RawLine> for Line {
    type Error = InvalidLine;

    fn try_from(raw: RawLine) -> Result<Self, Self::Error> {
        if raw.path.is_empty() {
            return Err(InvalidLine::Empty(raw.id));
        }
        if let Some(foreign) = raw.path.segments().iter().find(|s| s.line() != raw.id) {
            return Err(InvalidLine::ForeignSegment {
                line: raw.id,
                segment_line: foreign.line(),
            });
        }
        Ok(Line {
            id: raw.id,
            name: raw.name,
            color: raw.color,
            path: raw.path,
        })
    }
}

impl From<Line> for RawLine {
    fn from(line: Line) -> Self {
        RawLine {
            id: line.id,
            name: line.name,
            color: line.color,
            path: line.path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(s: &str) -> Station {
        Station::new(s).unwrap()
    }

    fn names(line: &Line) -> Vec<String> {
        line.stations()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Gangnam -> Guui -> Yeoksam, 10 apart.
    fn sinbundang() -> Line {
        let mut line =
            Line::new(LineId(1), "Sinbundang", "red", st("Gangnam"), st("Guui"), 10).unwrap();
        line.add_section(st("Guui"), st("Yeoksam"), 10).unwrap();
        line
    }

    #[test]
    fn new_line_has_one_segment() {
        let line = Line::new(LineId(4), "Line 2", "green", st("A"), st("B"), 5).unwrap();
        assert_eq!(line.path().len(), 1);
        assert_eq!(line.path().segments()[0].line(), LineId(4));
        assert_eq!(names(&line), ["A", "B"]);
    }

    #[test]
    fn new_line_rejects_invalid_segment() {
        assert!(Line::new(LineId(1), "x", "y", st("A"), st("A"), 5).is_err());
        assert!(Line::new(LineId(1), "x", "y", st("A"), st("B"), 0).is_err());
    }

    #[test]
    fn add_section_splits() {
        let mut line = sinbundang();
        assert_eq!(
            line.add_section(st("Gangnam"), st("Sinchon"), 3),
            Ok(Placement::SplitFront)
        );
        assert_eq!(names(&line), ["Gangnam", "Sinchon", "Guui", "Yeoksam"]);
    }

    #[test]
    fn delete_middle_station() {
        let mut line = sinbundang();
        line.remove_station(&st("Guui"), RemovalPolicy::AnyStation)
            .unwrap();
        assert_eq!(names(&line), ["Gangnam", "Yeoksam"]);
        assert_eq!(line.path().total_length(), Some(20));
    }

    #[test]
    fn delete_down_terminus_station() {
        let mut line = sinbundang();
        line.remove_station(&st("Yeoksam"), RemovalPolicy::TrailingTerminal)
            .unwrap();
        assert_eq!(names(&line), ["Gangnam", "Guui"]);
    }

    #[test]
    fn delete_up_terminus_station() {
        let mut line = sinbundang();
        line.remove_station(&st("Gangnam"), RemovalPolicy::AnyStation)
            .unwrap();
        assert_eq!(names(&line), ["Guui", "Yeoksam"]);
    }

    #[test]
    fn trailing_policy_rejects_middle_station() {
        let mut line = sinbundang();
        assert_eq!(
            line.remove_station(&st("Guui"), RemovalPolicy::TrailingTerminal),
            Err(PathError::NotTerminalStation(st("Guui")))
        );
        assert_eq!(names(&line), ["Gangnam", "Guui", "Yeoksam"]);
    }

    #[test]
    fn rename_keeps_path() {
        let mut line = sinbundang();
        line.rename("Shinbundang", "crimson");
        assert_eq!(line.name(), "Shinbundang");
        assert_eq!(line.color(), "crimson");
        assert_eq!(line.path().len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let line = sinbundang();
        let json = serde_json::to_string(&line).unwrap();
        let restored: Line = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, line);
    }

    #[test]
    fn deserialize_rejects_foreign_segments() {
        let json = r#"{
            "id": 1, "name": "Sinbundang", "color": "red",
            "path": [
                {"line": 1, "up": "Gangnam", "down": "Guui", "length": 10},
                {"line": 2, "up": "Guui", "down": "Yeoksam", "length": 10}
            ]
        }"#;
        let err = serde_json::from_str::<Line>(json).unwrap_err();
        assert!(err.to_string().contains("line#1 holds a segment belonging to line#2"));
    }

    #[test]
    fn deserialize_rejects_empty_path() {
        let json = r#"{ "id": 3, "name": "Empty", "color": "white", "path": [] }"#;
        let err = serde_json::from_str::<Line>(json).unwrap_err();
        assert!(err.to_string().contains("line#3 has no segments"));
    }
}
